//! `reservations.csv`.

use core::ops::ControlFlow;

use aviary_types::{parse_non_negative, parse_positive, Date, ParseError, Rejection, ValueError};

use super::{finish, non_empty, reset, value, LoadState};
use crate::parser::{FieldCallback, FieldGrammar, RecordGrammar};
use crate::store::ReservationDraft;

/// Columns of `reservations.csv`, also the header of `reservations_errors.csv`.
pub const HEADER: &str = "id;user_id;hotel_id;hotel_name;hotel_stars;city_tax;address;begin_date;end_date;price_per_night;includes_breakfast;room_details;rating;comment";

type State<'a> = LoadState<'a, ReservationDraft>;

fn rating_value(field: &str, kind: &'static str) -> Result<u8, ValueError> {
    match parse_positive(field, kind)? {
        n @ 1..=5 => Ok(n as u8),
        _ => Err(ValueError::OutOfRange { kind }),
    }
}

fn id(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.id = value(field)?;
    Ok(())
}

fn user_id(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    if !s.db.users().contains(field) {
        return Err(ValueError::UnknownReference { kind: "user" });
    }
    s.draft.user_id.push_str(field);
    Ok(())
}

fn hotel_id(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.hotel_id = value(field)?;
    Ok(())
}

fn hotel_name(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "hotel_name")?;
    s.draft.hotel_name.push_str(field);
    Ok(())
}

fn hotel_stars(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.hotel_stars = rating_value(field, "hotel_stars")?;
    Ok(())
}

fn city_tax(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    let tax = parse_non_negative(field, "city_tax")?;
    s.draft.city_tax = u32::try_from(tax).map_err(|_| ValueError::OutOfRange { kind: "city_tax" })?;
    Ok(())
}

fn address(_: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "address")
}

fn begin_date(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.begin_date = value(field)?;
    Ok(())
}

fn end_date(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    let end: Date = value(field)?;
    if end < s.draft.begin_date {
        return Err(ValueError::Inconsistent("reservation ends before it begins"));
    }
    s.draft.end_date = end;
    Ok(())
}

fn price_per_night(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    let price = parse_positive(field, "price_per_night")?;
    s.draft.price_per_night =
        u32::try_from(price).map_err(|_| ValueError::OutOfRange { kind: "price_per_night" })?;
    Ok(())
}

fn includes_breakfast(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.includes_breakfast = value(field)?;
    Ok(())
}

fn free_text(_: &mut State<'_>, _: &str) -> Result<(), ValueError> {
    Ok(())
}

fn rating(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.rating = if field.is_empty() {
        None
    } else {
        Some(rating_value(field, "rating")?)
    };
    Ok(())
}

fn commit(s: &mut State<'_>) -> Result<(), ParseError> {
    let id = s.draft.id;
    s.db.reservations_mut().add(&s.draft)?;
    s.db.users_mut().add_reservation(&s.draft.user_id, id)?;
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
        user_id as FieldCallback<State<'a>>,
        hotel_id as FieldCallback<State<'a>>,
        hotel_name as FieldCallback<State<'a>>,
        hotel_stars as FieldCallback<State<'a>>,
        city_tax as FieldCallback<State<'a>>,
        address as FieldCallback<State<'a>>,
        begin_date as FieldCallback<State<'a>>,
        end_date as FieldCallback<State<'a>>,
        price_per_night as FieldCallback<State<'a>>,
        includes_breakfast as FieldCallback<State<'a>>,
        free_text as FieldCallback<State<'a>>,
        rating as FieldCallback<State<'a>>,
        free_text as FieldCallback<State<'a>>,
    ].to_vec();
    RecordGrammar::new(b'\n', FieldGrammar::new(b';', fields), after)
        .with_before(reset::<ReservationDraft>)
        .skip_header(skip_header)
}
