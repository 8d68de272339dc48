//! `passengers.csv`: links users to the flights they took.

use core::ops::ControlFlow;

use aviary_types::{parse_positive, FlightId, ParseError, Rejection, ValueError};

use super::{finish, reset, LoadState};
use crate::parser::{FieldCallback, FieldGrammar, RecordGrammar};

/// Columns of `passengers.csv`, also the header of `passengers_errors.csv`.
pub const HEADER: &str = "flight_id;user_id";

#[derive(Debug, Default)]
pub(crate) struct Passenger {
    flight: FlightId,
    user: String,
}

type State<'a> = LoadState<'a, Passenger>;

fn flight_id(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    let id = FlightId(parse_positive(field, "flight id")?);
    if !s.db.flights().contains(id) {
        return Err(ValueError::UnknownReference { kind: "flight" });
    }
    s.draft.flight = id;
    Ok(())
}

fn user_id(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    if !s.db.users().contains(field) {
        return Err(ValueError::UnknownReference { kind: "user" });
    }
    s.draft.user.push_str(field);
    Ok(())
}

fn commit(s: &mut State<'_>) -> Result<(), ParseError> {
    s.db.users_mut().add_flight(&s.draft.user, s.draft.flight)?;
    s.db.flights_mut().add_passenger(s.draft.flight)?;
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
    let fields = [flight_id as FieldCallback<State<'a>>, user_id as FieldCallback<State<'a>>].to_vec();
    RecordGrammar::new(b'\n', FieldGrammar::new(b';', fields), after)
        .with_before(reset::<Passenger>)
        .skip_header(skip_header)
}
