//! Query 9: active users whose name starts with a prefix.

use aviary_types::ValueError;

use super::{expect_arguments, Query, QueryWriter};
use crate::pool::SlotId;
use crate::store::Database;

/// Active users sorted by name, then identifier. Names sharing a prefix are
/// contiguous, so every lookup is a binary search plus a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedUsers {
    slots: Vec<SlotId>,
}

impl SortedUsers {
    /// Sorts the active users of `db`.
    pub fn compute(db: &Database) -> Self {
        let users = db.users();
        let mut entries: Vec<(&str, &str, SlotId)> = users
            .iter()
            .filter(|user| user.is_active())
            .map(|user| (user.name(), user.id(), user.slot()))
            .collect();
        entries.sort_unstable();
        Self {
            slots: entries.into_iter().map(|(_, _, slot)| slot).collect(),
        }
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if there are no users.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Identifiers and names of the users whose name starts with `prefix`,
    /// in order.
    pub fn with_prefix<'a>(
        &'a self,
        db: &'a Database,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let users = db.users().entities();
        let name = move |slot: SlotId| users.get(slot).map(|u| (u.id(), u.name()));

        let start = self
            .slots
            .partition_point(|&slot| name(slot).is_some_and(|(_, n)| n < prefix));
        self.slots[start..]
            .iter()
            .map_while(move |&slot| name(slot).filter(|(_, n)| n.starts_with(prefix)))
    }
}

/// Looks users up by name prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsersByNamePrefix;

impl Query for UsersByNamePrefix {
    type Args = String;
    type Stats = SortedUsers;

    fn parse_arguments(&self, args: &[&str]) -> Result<String, ValueError> {
        expect_arguments(args, 1)?;
        Ok(args[0].to_owned())
    }

    fn generate_statistics(&self, db: &Database, _: &[&String]) -> Option<SortedUsers> {
        Some(SortedUsers::compute(db))
    }

    fn execute(&self, db: &Database, stats: Option<&SortedUsers>, prefix: &String, out: &mut QueryWriter) {
        let Some(stats) = stats else {
            return;
        };
        for (id, name) in stats.with_prefix(db, prefix) {
            out.begin_object();
            out.field("id", id);
            out.field("name", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserDraft;
    use aviary_types::AccountStatus;

    fn database() -> Database {
        let mut db = Database::default();
        let users = [
            ("u4", "João Silva", AccountStatus::Active),
            ("u1", "Joana", AccountStatus::Active),
            ("u3", "João Matos", AccountStatus::Active),
            ("u2", "João Matos", AccountStatus::Active),
            ("u5", "João Zé", AccountStatus::Inactive),
            ("u6", "Jo", AccountStatus::Active),
            ("u7", "Maria", AccountStatus::Active),
        ];
        for (id, name, status) in users {
            db.users_mut()
                .add(&UserDraft {
                    id: id.into(),
                    name: name.into(),
                    passport: "P".into(),
                    account_status: status,
                    ..UserDraft::default()
                })
                .unwrap();
        }
        db
    }

    fn run(db: &Database, prefix: &str) -> String {
        let query = UsersByNamePrefix;
        let stats = query.generate_statistics(db, &[]);
        let mut out = QueryWriter::new(false);
        query.execute(db, stats.as_ref(), &prefix.to_owned(), &mut out);
        out.finish()
    }

    #[test]
    fn sorted_by_name_then_id() {
        let db = database();
        assert_eq!(SortedUsers::compute(&db).len(), 6);
        assert_eq!(
            run(&db, "João"),
            "u2;João Matos\nu3;João Matos\nu4;João Silva\n"
        );
    }

    #[test]
    fn prefix_boundaries() {
        let db = database();
        assert_eq!(run(&db, "Jo"), "u6;Jo\nu1;Joana\nu2;João Matos\nu3;João Matos\nu4;João Silva\n");
        assert_eq!(run(&db, "M"), "u7;Maria\n");
        assert_eq!(run(&db, "X"), "");
        assert_eq!(run(&db, "João Z"), "", "inactive users are skipped");
    }
}
