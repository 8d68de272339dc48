//! Dataset loading.
//!
//! A dataset is a directory holding `users.csv`, `flights.csv`,
//! `passengers.csv` and `reservations.csv`. They are loaded in that order,
//! because later files refer to entities of earlier ones. Every rejected
//! record is copied verbatim to `<kind>_errors.csv` in an errors directory,
//! below a header line naming the columns.
//!
//! ```ignore
//! let mut db = Database::new(&StoreConfig::default());
//! let report = db.load_dir("dataset/", "errors/", &mut ())?;
//! println!("{report}");
//! ```

mod flights;
mod passengers;
mod reservations;
mod users;

use core::fmt;
use core::ops::ControlFlow;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use aviary_types::{LoadError, ParseError, Rejection, ValueError};
use tracing::{debug, info};

use crate::parser::{ParseSummary, RecordGrammar, RecordParser};
use crate::store::Database;

pub use flights::HEADER as FLIGHTS_HEADER;
pub use passengers::HEADER as PASSENGERS_HEADER;
pub use reservations::HEADER as RESERVATIONS_HEADER;
pub use users::HEADER as USERS_HEADER;

/// A point in the load sequence, reported to a [`LoadObserver`] when reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStep {
    /// About to load users.
    Users,
    /// About to load flights.
    Flights,
    /// About to load passengers.
    Passengers,
    /// About to load reservations.
    Reservations,
    /// Every file was loaded.
    Done,
}

impl LoadStep {
    /// The four steps that read a file, in load order.
    pub const FILES: [LoadStep; 4] = [
        LoadStep::Users,
        LoadStep::Flights,
        LoadStep::Passengers,
        LoadStep::Reservations,
    ];

    /// Lower case name, also the stem of the input file.
    pub const fn name(self) -> &'static str {
        match self {
            LoadStep::Users => "users",
            LoadStep::Flights => "flights",
            LoadStep::Passengers => "passengers",
            LoadStep::Reservations => "reservations",
            LoadStep::Done => "done",
        }
    }

    /// Header line of this step's rejection file.
    pub const fn error_header(self) -> &'static str {
        match self {
            LoadStep::Users => users::HEADER,
            LoadStep::Flights => flights::HEADER,
            LoadStep::Passengers => passengers::HEADER,
            LoadStep::Reservations => reservations::HEADER,
            LoadStep::Done => "",
        }
    }
}

impl fmt::Display for LoadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives checkpoints while a dataset loads.
pub trait LoadObserver {
    /// Called when `step` is reached.
    fn checkpoint(&mut self, step: LoadStep) {
        let _ = step;
    }
}

impl LoadObserver for () {}

impl<O: LoadObserver + ?Sized> LoadObserver for &mut O {
    fn checkpoint(&mut self, step: LoadStep) {
        (**self).checkpoint(step);
    }
}

/// Outcome of one load step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Which file.
    pub step: LoadStep,
    /// Record counters.
    pub summary: ParseSummary,
}

/// Outcome of a whole dataset load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// One entry per loaded file, in load order.
    pub steps: Vec<StepReport>,
}

impl LoadReport {
    /// Counters for `step`, if it ran.
    pub fn step(&self, step: LoadStep) -> Option<&ParseSummary> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.summary)
    }

    /// Records accepted across every step.
    pub fn accepted(&self) -> usize {
        self.steps.iter().map(|s| s.summary.accepted).sum()
    }

    /// Records rejected across every step.
    pub fn rejected(&self) -> usize {
        self.steps.iter().map(|s| s.summary.rejected).sum()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{}: {}/{} accepted",
                s.step, s.summary.accepted, s.summary.records
            )?;
        }
        Ok(())
    }
}

/// Parse state shared by every load step: the store being filled, the
/// rejection sink and the entity being built from the current record.
pub(crate) struct LoadState<'a, D> {
    pub(crate) db: &'a mut Database,
    errors: &'a mut dyn Write,
    pub(crate) draft: D,
}

impl<'a, D: Default> LoadState<'a, D> {
    fn new(db: &'a mut Database, errors: &'a mut dyn Write) -> Self {
        Self {
            db,
            errors,
            draft: D::default(),
        }
    }
}

impl<D> LoadState<'_, D> {
    fn reject(&mut self, raw: &[u8], why: &Rejection) -> Result<(), ParseError> {
        debug!(record = %String::from_utf8_lossy(raw), reason = %why, "rejected record");
        self.errors.write_all(raw)?;
        self.errors.write_all(b"\n")?;
        Ok(())
    }
}

/// `before` hook of every step: starts each record from an empty draft.
pub(crate) fn reset<D: Default>(state: &mut LoadState<'_, D>, _: &str) -> ControlFlow<()> {
    state.draft = D::default();
    ControlFlow::Continue(())
}

/// Shared `after` logic: echo rejections, commit the rest.
pub(crate) fn finish<D>(
    state: &mut LoadState<'_, D>,
    raw: &[u8],
    outcome: Result<(), Rejection>,
    commit: fn(&mut LoadState<'_, D>) -> Result<(), ParseError>,
) -> Result<ControlFlow<()>, ParseError> {
    match outcome {
        Ok(()) => commit(state)?,
        Err(why) => state.reject(raw, &why)?,
    }
    Ok(ControlFlow::Continue(()))
}

/// Fails on an empty mandatory field.
#[inline]
pub(crate) fn non_empty(field: &str, name: &'static str) -> Result<(), ValueError> {
    if field.is_empty() {
        Err(ValueError::Empty { field: name })
    } else {
        Ok(())
    }
}

/// Parses `field` with its [`FromStr`](core::str::FromStr) implementation.
#[inline]
pub(crate) fn value<T>(field: &str) -> Result<T, ValueError>
where
    T: core::str::FromStr<Err = ValueError>,
{
    field.parse()
}

/// Loads dataset files into a [`Database`], one step at a time.
///
/// Steps may be run individually on any reader; [`DatasetLoader::load_dir`]
/// runs all four from a directory.
pub struct DatasetLoader<'db> {
    db: &'db mut Database,
}

impl<'db> DatasetLoader<'db> {
    /// Creates a loader filling `db`.
    pub fn new(db: &'db mut Database) -> Self {
        Self { db }
    }

    /// Loads users.
    pub fn load_users<R: BufRead, W: Write>(
        &mut self,
        input: R,
        errors: &mut W,
    ) -> Result<ParseSummary, ParseError> {
        let grammar = users::grammar(self.db.config().skip_header);
        Self::run(&mut *self.db, LoadStep::Users, grammar, input, errors)
    }

    /// Loads flights.
    pub fn load_flights<R: BufRead, W: Write>(
        &mut self,
        input: R,
        errors: &mut W,
    ) -> Result<ParseSummary, ParseError> {
        let grammar = flights::grammar(self.db.config().skip_header);
        Self::run(&mut *self.db, LoadStep::Flights, grammar, input, errors)
    }

    /// Loads passengers. Users and flights must already be loaded.
    pub fn load_passengers<R: BufRead, W: Write>(
        &mut self,
        input: R,
        errors: &mut W,
    ) -> Result<ParseSummary, ParseError> {
        let grammar = passengers::grammar(self.db.config().skip_header);
        Self::run(&mut *self.db, LoadStep::Passengers, grammar, input, errors)
    }

    /// Loads reservations. Users must already be loaded.
    pub fn load_reservations<R: BufRead, W: Write>(
        &mut self,
        input: R,
        errors: &mut W,
    ) -> Result<ParseSummary, ParseError> {
        let grammar = reservations::grammar(self.db.config().skip_header);
        Self::run(&mut *self.db, LoadStep::Reservations, grammar, input, errors)
    }

    fn run<'s, D: Default, R: BufRead, W: Write>(
        db: &'s mut Database,
        step: LoadStep,
        grammar: RecordGrammar<LoadState<'s, D>>,
        input: R,
        errors: &'s mut W,
    ) -> Result<ParseSummary, ParseError> {
        errors.write_all(step.error_header().as_bytes())?;
        errors.write_all(b"\n")?;

        let mut state = LoadState::new(db, errors);
        let summary = RecordParser::parse(input, &grammar, &mut state)?;
        state.errors.flush()?;

        info!(
            step = step.name(),
            records = summary.records,
            accepted = summary.accepted,
            rejected = summary.rejected,
            "load step finished"
        );
        Ok(summary)
    }

    /// Loads the four dataset files of `dataset`, writing rejection files to
    /// `errors`.
    ///
    /// # Errors
    ///
    /// [`LoadError::Open`] if a file cannot be opened or created, and
    /// [`LoadError::Step`] if a step hits an I/O or allocation failure.
    /// Entities committed by earlier steps stay in the store.
    pub fn load_dir<O: LoadObserver>(
        &mut self,
        dataset: &Path,
        errors: &Path,
        mut observer: O,
    ) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();

        for step in LoadStep::FILES {
            observer.checkpoint(step);

            let input_path = dataset.join(format!("{}.csv", step.name()));
            let input = File::open(&input_path).map_err(|source| LoadError::Open {
                path: input_path.clone(),
                source,
            })?;
            let errors_path = errors.join(format!("{}_errors.csv", step.name()));
            let output = File::create(&errors_path).map_err(|source| LoadError::Open {
                path: errors_path.clone(),
                source,
            })?;

            let input = BufReader::new(input);
            let mut output = BufWriter::new(output);
            let summary = match step {
                LoadStep::Users => self.load_users(input, &mut output),
                LoadStep::Flights => self.load_flights(input, &mut output),
                LoadStep::Passengers => self.load_passengers(input, &mut output),
                LoadStep::Reservations => self.load_reservations(input, &mut output),
                LoadStep::Done => continue,
            }
            .map_err(|source| LoadError::Step {
                step: step.name(),
                source,
            })?;

            report.steps.push(StepReport { step, summary });
        }

        observer.checkpoint(LoadStep::Done);
        Ok(report)
    }
}

impl Database {
    /// Loads a dataset directory. See [`DatasetLoader::load_dir`].
    pub fn load_dir(
        &mut self,
        dataset: impl AsRef<Path>,
        errors: impl AsRef<Path>,
        observer: impl LoadObserver,
    ) -> Result<LoadReport, LoadError> {
        DatasetLoader::new(self).load_dir(dataset.as_ref(), errors.as_ref(), observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aviary_types::StoreConfig;
    use std::io::Cursor;

    #[derive(Default)]
    struct Steps(Vec<LoadStep>);

    impl LoadObserver for Steps {
        fn checkpoint(&mut self, step: LoadStep) {
            self.0.push(step);
        }
    }

    #[test]
    fn step_names_and_headers() {
        assert_eq!(LoadStep::Passengers.to_string(), "passengers");
        assert_eq!(LoadStep::Passengers.error_header(), "flight_id;user_id");
        assert!(LoadStep::Users.error_header().starts_with("id;name;email"));
    }

    #[test]
    fn errors_file_always_has_header() {
        let mut db = Database::new(&StoreConfig::default());
        let mut errors = Vec::new();
        let summary = DatasetLoader::new(&mut db)
            .load_passengers(Cursor::new("flight_id;user_id\n"), &mut errors)
            .expect("should load");

        assert_eq!(summary.records, 0);
        assert_eq!(errors, b"flight_id;user_id\n");
    }

    #[test]
    fn observer_sees_every_checkpoint() {
        let dir = tempfile::tempdir().expect("should create dir");
        for step in LoadStep::FILES {
            let path = dir.path().join(format!("{}.csv", step.name()));
            std::fs::write(path, format!("{}\n", step.error_header())).expect("should write");
        }

        let mut steps = Steps::default();
        let mut db = Database::default();
        let report = db
            .load_dir(dir.path(), dir.path(), &mut steps)
            .expect("should load");

        assert_eq!(
            steps.0,
            [
                LoadStep::Users,
                LoadStep::Flights,
                LoadStep::Passengers,
                LoadStep::Reservations,
                LoadStep::Done
            ]
        );
        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.accepted(), 0);
        assert!(dir.path().join("reservations_errors.csv").exists());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().expect("should create dir");
        let mut db = Database::default();
        let err = db.load_dir(dir.path(), dir.path(), ()).unwrap_err();
        match err {
            LoadError::Open { path, .. } => assert!(path.ends_with("users.csv")),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn report_display() {
        let report = LoadReport {
            steps: vec![StepReport {
                step: LoadStep::Users,
                summary: ParseSummary {
                    records: 4,
                    accepted: 3,
                    rejected: 1,
                    stopped: false,
                },
            }],
        };
        assert_eq!(report.to_string(), "users: 3/4 accepted");
        assert_eq!(report.rejected(), 1);
        assert_eq!(report.step(LoadStep::Users).map(|s| s.accepted), Some(3));
        assert!(report.step(LoadStep::Flights).is_none());
    }
}
