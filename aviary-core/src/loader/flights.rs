//! `flights.csv`.

use core::ops::ControlFlow;

use aviary_types::{parse_positive, DateTime, FlightId, ParseError, Rejection, ValueError};

use super::{finish, non_empty, reset, value, LoadState};
use crate::parser::{FieldCallback, FieldGrammar, RecordGrammar};
use crate::store::FlightDraft;

/// Columns of `flights.csv`, also the header of `flights_errors.csv`.
pub const HEADER: &str = "id;airline;plane_model;total_seats;origin;destination;schedule_departure_date;schedule_arrival_date;real_departure_date;real_arrival_date;pilot;copilot;notes";

type State<'a> = LoadState<'a, FlightDraft>;

fn id(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.id = FlightId(parse_positive(field, "flight id")?);
    Ok(())
}

fn airline(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "airline")?;
    s.draft.airline.push_str(field);
    Ok(())
}

fn plane_model(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "plane_model")?;
    s.draft.plane_model.push_str(field);
    Ok(())
}

fn total_seats(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.total_seats = parse_positive(field, "total_seats")?;
    Ok(())
}

fn origin(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.origin = value(field)?;
    Ok(())
}

fn destination(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.destination = value(field)?;
    Ok(())
}

fn schedule_departure(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.schedule_departure = value(field)?;
    Ok(())
}

fn schedule_arrival(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    let arrival: DateTime = value(field)?;
    if arrival < s.draft.schedule_departure {
        return Err(ValueError::Inconsistent("scheduled arrival before departure"));
    }
    s.draft.schedule_arrival = arrival;
    Ok(())
}

fn real_departure(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.real_departure = value(field)?;
    Ok(())
}

fn real_arrival(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    let arrival: DateTime = value(field)?;
    if arrival < s.draft.real_departure {
        return Err(ValueError::Inconsistent("real arrival before departure"));
    }
    Ok(())
}

fn pilot(_: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "pilot")
}

fn copilot(_: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "copilot")
}

fn notes(_: &mut State<'_>, _: &str) -> Result<(), ValueError> {
    Ok(())
}

fn commit(s: &mut State<'_>) -> Result<(), ParseError> {
    s.db.flights_mut().add(&s.draft)?;
    Ok(())
}

fn after(
    s: &mut State<'_>,
    raw: &[u8],
    outcome: Result<(), Rejection>,
) -> Result<ControlFlow<()>, ParseError> {
    finish(s, raw, outcome, commit)
}

pub(super) fn grammar<'a>(skip_header: bool) -> RecordGrammar<State<'a>> {
    let fields = [
        id as FieldCallback<State<'a>>,
        airline as FieldCallback<State<'a>>,
        plane_model as FieldCallback<State<'a>>,
        total_seats as FieldCallback<State<'a>>,
        origin as FieldCallback<State<'a>>,
        destination as FieldCallback<State<'a>>,
        schedule_departure as FieldCallback<State<'a>>,
        schedule_arrival as FieldCallback<State<'a>>,
        real_departure as FieldCallback<State<'a>>,
        real_arrival as FieldCallback<State<'a>>,
        pilot as FieldCallback<State<'a>>,
        copilot as FieldCallback<State<'a>>,
        notes as FieldCallback<State<'a>>,
    ].to_vec();
    RecordGrammar::new(b'\n', FieldGrammar::new(b';', fields), after)
        .with_before(reset::<FlightDraft>)
        .skip_header(skip_header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DatasetLoader;
    use crate::store::Database;
    use std::io::Cursor;

    const GOOD: &str = "0000000001;TAP;A321;180;lis;MAD;2023/01/01 10:00:00;2023/01/01 11:30:00;2023/01/01 10:20:00;2023/01/01 11:45:00;Rui;Eva;";

    fn load(records: &[&str]) -> (Database, String) {
        let input = format!("{HEADER}\n{}\n", records.join("\n"));
        let mut db = Database::default();
        let mut errors = Vec::new();
        DatasetLoader::new(&mut db)
            .load_flights(Cursor::new(input), &mut errors)
            .expect("should load");
        (db, String::from_utf8(errors).expect("should be UTF-8"))
    }

    #[test]
    fn valid_flight_is_stored() {
        let (db, _) = load(&[GOOD]);
        let flight = db.flights().get_by_id(FlightId(1)).expect("should exist");
        assert_eq!(flight.airline(), "TAP");
        assert_eq!(flight.origin().to_string(), "LIS");
        assert_eq!(flight.total_seats(), 180);
        assert_eq!(flight.departure_delay(), 20 * 60);
        assert_eq!(flight.number_of_passengers(), 0);
    }

    #[test]
    fn inconsistent_times_are_rejected() {
        let early_arrival = GOOD.replace("2023/01/01 11:30:00", "2023/01/01 09:00:00");
        let early_landing = GOOD.replace("2023/01/01 11:45:00", "2023/01/01 10:00:00");
        let (db, errors) = load(&[early_arrival.as_str(), early_landing.as_str()]);
        assert!(db.flights().is_empty());
        assert_eq!(errors.lines().count(), 3);
    }

    #[test]
    fn seats_must_be_positive() {
        let zero = GOOD.replace(";180;", ";0;");
        let (db, errors) = load(&[zero.as_str()]);
        assert!(db.flights().is_empty());
        assert_eq!(errors.lines().nth(1), Some(zero.as_str()));
    }

    #[test]
    fn large_seat_counts_are_accepted() {
        let large = GOOD.replace(";180;", ";70000;");
        let (db, errors) = load(&[large.as_str()]);
        let flight = db.flights().get_by_id(FlightId(1)).expect("should exist");
        assert_eq!(flight.total_seats(), 70_000);
        assert_eq!(errors.lines().count(), 1);
    }

    #[test]
    fn flight_id_zero_is_rejected() {
        let zero = GOOD.replace("0000000001", "0000000000");
        let (db, errors) = load(&[zero.as_str()]);
        assert!(db.flights().is_empty());
        assert_eq!(errors.lines().nth(1), Some(zero.as_str()));
    }

    #[test]
    fn notes_may_hold_anything_but_pilots_may_not_be_empty() {
        let noted = format!("{GOOD}late again");
        let no_pilot = GOOD.replace(";Rui;", ";;").replace("0000000001", "0000000002");
        let (db, _) = load(&[noted.as_str(), no_pilot.as_str()]);
        assert!(db.flights().contains(FlightId(1)));
        assert!(!db.flights().contains(FlightId(2)));
    }
}
