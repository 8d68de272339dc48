//! `users.csv`.

use core::ops::ControlFlow;

use aviary_types::{validate_email, DateTime, ParseError, Rejection, ValueError};

use super::{finish, non_empty, reset, value, LoadState};
use crate::parser::{FieldCallback, FieldGrammar, RecordGrammar};
use crate::store::UserDraft;

/// Columns of `users.csv`, also the header of `users_errors.csv`.
pub const HEADER: &str = "id;name;email;phone_number;birth_date;sex;passport;country_code;address;account_creation;pay_method;account_status";

type State<'a> = LoadState<'a, UserDraft>;

fn id(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "id")?;
    s.draft.id.push_str(field);
    Ok(())
}

fn name(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "name")?;
    s.draft.name.push_str(field);
    Ok(())
}

fn email(_: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    validate_email(field)
}

fn phone_number(_: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "phone_number")
}

fn birth_date(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.birth_date = value(field)?;
    Ok(())
}

fn sex(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.sex = value(field)?;
    Ok(())
}

fn passport(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "passport")?;
    s.draft.passport.push_str(field);
    Ok(())
}

fn country_code(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.country_code = value(field)?;
    Ok(())
}

fn address(_: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "address")
}

fn account_creation(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    let created: DateTime = value(field)?;
    if created.date() < s.draft.birth_date {
        return Err(ValueError::Inconsistent("account created before birth"));
    }
    s.draft.account_creation = created;
    Ok(())
}

fn pay_method(_: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    non_empty(field, "pay_method")
}

fn account_status(s: &mut State<'_>, field: &str) -> Result<(), ValueError> {
    s.draft.account_status = value(field)?;
    Ok(())
}

fn commit(s: &mut State<'_>) -> Result<(), ParseError> {
    s.db.users_mut().add(&s.draft)?;
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
        name as FieldCallback<State<'a>>,
        email as FieldCallback<State<'a>>,
        phone_number as FieldCallback<State<'a>>,
        birth_date as FieldCallback<State<'a>>,
        sex as FieldCallback<State<'a>>,
        passport as FieldCallback<State<'a>>,
        country_code as FieldCallback<State<'a>>,
        address as FieldCallback<State<'a>>,
        account_creation as FieldCallback<State<'a>>,
        pay_method as FieldCallback<State<'a>>,
        account_status as FieldCallback<State<'a>>,
    ].to_vec();
    RecordGrammar::new(b'\n', FieldGrammar::new(b';', fields), after)
        .with_before(reset::<UserDraft>)
        .skip_header(skip_header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DatasetLoader;
    use crate::store::Database;
    use std::io::Cursor;

    const GOOD: &str = "U1;Ana Silva;ana@mail.pt;912;1990/04/02;F;PT123;PT;Rua 1;2015/01/01 10:00:00;cash;active";

    fn load(records: &[&str]) -> (Database, String) {
        let mut input = String::from(HEADER);
        for r in records {
            input.push('\n');
            input.push_str(r);
        }
        let mut db = Database::default();
        let mut errors = Vec::new();
        DatasetLoader::new(&mut db)
            .load_users(Cursor::new(input), &mut errors)
            .expect("should load");
        (db, String::from_utf8(errors).expect("should be UTF-8"))
    }

    #[test]
    fn valid_user_is_stored() {
        let (db, errors) = load(&[GOOD]);
        let user = db.users().get_by_id("U1").expect("should exist");
        assert_eq!(user.name(), "Ana Silva");
        assert_eq!(user.passport(), "PT123");
        assert_eq!(user.country_code().to_string(), "PT");
        assert!(user.is_active());
        assert_eq!(errors, format!("{HEADER}\n"));
    }

    #[test]
    fn each_bad_field_rejects_the_record() {
        let bad = [
            GOOD.replace("U1;", ";"),
            GOOD.replace("ana@mail.pt", "ana.mail.pt"),
            GOOD.replace("1990/04/02", "1990/4/2"),
            GOOD.replace(";F;", ";X;"),
            GOOD.replace(";PT;", ";PRT;"),
            GOOD.replace("2015/01/01 10:00:00", "1980/01/01 10:00:00"),
            GOOD.replace(";cash;", ";;"),
            GOOD.replace("active", "banned"),
        ];
        let records: Vec<&str> = bad.iter().map(String::as_str).collect();
        let (db, errors) = load(&records);

        assert!(db.users().is_empty());
        let echoed: Vec<&str> = errors.lines().skip(1).collect();
        assert_eq!(echoed, records);
    }

    #[test]
    fn rejected_record_leaves_no_trace() {
        let inactive = GOOD.replace("active", "?");
        let renamed = GOOD.replace("U1", "U2");
        let (db, _) = load(&[inactive.as_str(), renamed.as_str()]);
        assert_eq!(db.users().len(), 1);
        let user = db.users().get_by_id("U2").expect("should exist");
        assert_eq!(user.name(), "Ana Silva", "draft is reset between records");
        assert!(db.users().get_by_id("U1").is_none());
    }
}
