//! Two-level record grammars.
//!
//! A [`RecordGrammar`] says how a stream splits into records and what to do
//! around each record; its [`FieldGrammar`] says how a record splits into
//! fields and which validator each field goes to. Grammars are plain data
//! built from `fn` pointers, so they can be built per load step and passed
//! around freely.

use core::fmt;
use core::ops::ControlFlow;

use aviary_types::{ParseError, Rejection, ValueError};

use super::fields::FieldSplitter;

/// Validates and stores one field. Positional: the n-th callback receives the
/// n-th field.
pub type FieldCallback<S> = fn(&mut S, &str) -> Result<(), ValueError>;

/// Runs before a record is split. Breaking stops the parse.
pub type BeforeCallback<S> = fn(&mut S, &str) -> ControlFlow<()>;

/// Runs after every record with the record bytes, delimiter removed, and the
/// outcome.
///
/// Breaking stops the parse; an error aborts it.
pub type AfterCallback<S> =
    fn(&mut S, &[u8], Result<(), Rejection>) -> Result<ControlFlow<()>, ParseError>;

/// Splits a record into exactly `N` fields and feeds them to `N` callbacks.
pub struct FieldGrammar<S> {
    splitter: FieldSplitter,
    callbacks: Vec<FieldCallback<S>>,
}

impl<S> FieldGrammar<S> {
    /// Creates a grammar expecting one field per callback.
    pub fn new(delimiter: u8, callbacks: Vec<FieldCallback<S>>) -> Self {
        Self {
            splitter: FieldSplitter::new(delimiter),
            callbacks,
        }
    }

    /// Number of fields a record must have.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.callbacks.len()
    }

    /// The field delimiter.
    #[inline]
    pub fn delimiter(&self) -> u8 {
        self.splitter.delimiter()
    }

    /// Parses one record.
    ///
    /// A record with the wrong number of fields is rejected before any
    /// callback runs. Otherwise callbacks run in order and the first failure
    /// rejects the record; later fields are not looked at.
    pub fn parse(&self, state: &mut S, record: &str) -> Result<(), Rejection> {
        let fields = self.splitter.split(record);
        if fields.len() != self.callbacks.len() {
            return Err(Rejection::FieldCount {
                expected: self.callbacks.len(),
                found: fields.len(),
            });
        }

        for (index, (callback, field)) in self.callbacks.iter().zip(fields).enumerate() {
            callback(state, field).map_err(|source| Rejection::Field { index, source })?;
        }
        Ok(())
    }
}

impl<S> Clone for FieldGrammar<S> {
    fn clone(&self) -> Self {
        Self {
            splitter: self.splitter,
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<S> fmt::Debug for FieldGrammar<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldGrammar")
            .field("delimiter", &(self.splitter.delimiter() as char))
            .field("fields", &self.callbacks.len())
            .finish()
    }
}

/// Splits a stream into records and wraps each record in before/after hooks.
pub struct RecordGrammar<S> {
    pub(crate) delimiter: u8,
    pub(crate) skip_header: bool,
    pub(crate) fields: FieldGrammar<S>,
    pub(crate) before: Option<BeforeCallback<S>>,
    pub(crate) after: AfterCallback<S>,
}

impl<S> RecordGrammar<S> {
    /// Creates a grammar. The header is not skipped and there is no `before`
    /// hook until configured.
    pub fn new(delimiter: u8, fields: FieldGrammar<S>, after: AfterCallback<S>) -> Self {
        debug_assert!(delimiter.is_ascii(), "record delimiter must be ASCII");
        Self {
            delimiter,
            skip_header: false,
            fields,
            before: None,
            after,
        }
    }

    /// Sets the hook that runs before each record.
    pub fn with_before(mut self, before: BeforeCallback<S>) -> Self {
        self.before = Some(before);
        self
    }

    /// Whether the first record is a header to skip.
    pub fn skip_header(mut self, skip: bool) -> Self {
        self.skip_header = skip;
        self
    }

    /// The record delimiter.
    #[inline]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// The field grammar.
    #[inline]
    pub fn fields(&self) -> &FieldGrammar<S> {
        &self.fields
    }
}

impl<S> Clone for RecordGrammar<S> {
    fn clone(&self) -> Self {
        Self {
            delimiter: self.delimiter,
            skip_header: self.skip_header,
            fields: self.fields.clone(),
            before: self.before,
            after: self.after,
        }
    }
}

impl<S> fmt::Debug for RecordGrammar<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordGrammar")
            .field("delimiter", &(self.delimiter as char))
            .field("skip_header", &self.skip_header)
            .field("fields", &self.fields)
            .field("before", &self.before.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pair {
        a: u32,
        b: String,
    }

    fn parse_a(s: &mut Pair, field: &str) -> Result<(), ValueError> {
        s.a = field.parse().map_err(|_| ValueError::Malformed { kind: "a" })?;
        Ok(())
    }

    fn parse_b(s: &mut Pair, field: &str) -> Result<(), ValueError> {
        if field.is_empty() {
            return Err(ValueError::Empty { field: "b" });
        }
        s.b = field.to_owned();
        Ok(())
    }

    fn grammar() -> FieldGrammar<Pair> {
        FieldGrammar::new(b';', vec![parse_a, parse_b])
    }

    #[test]
    fn callbacks_run_in_order() {
        let mut state = Pair::default();
        grammar().parse(&mut state, "42;hello").unwrap();
        assert_eq!(state.a, 42);
        assert_eq!(state.b, "hello");
    }

    #[test]
    fn wrong_field_count() {
        let mut state = Pair::default();
        assert_eq!(
            grammar().parse(&mut state, "1;2;3"),
            Err(Rejection::FieldCount {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(state.a, 0, "no callback runs on a count mismatch");
    }

    #[test]
    fn first_failure_stops_the_record() {
        let mut state = Pair::default();
        assert_eq!(
            grammar().parse(&mut state, "x;"),
            Err(Rejection::Field {
                index: 0,
                source: ValueError::Malformed { kind: "a" }
            })
        );
        assert_eq!(
            grammar().parse(&mut state, "7;"),
            Err(Rejection::Field {
                index: 1,
                source: ValueError::Empty { field: "b" }
            })
        );
        assert_eq!(state.a, 7);
    }

    #[test]
    fn grammars_are_cloneable_configuration() {
        fn after(_: &mut Pair, _: &[u8], _: Result<(), Rejection>) -> Result<ControlFlow<()>, ParseError> {
            Ok(ControlFlow::Continue(()))
        }
        let records = RecordGrammar::new(b'\n', grammar(), after).skip_header(true);
        let copy = records.clone();
        assert_eq!(copy.fields().field_count(), 2);
        assert_eq!(copy.delimiter(), b'\n');
        assert!(copy.skip_header);
        assert!(format!("{copy:?}").contains("skip_header: true"));
    }
}
