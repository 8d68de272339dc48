//! Users and their relation lists.

use core::ops::ControlFlow;

use aviary_types::{
    AccountStatus, CountryCode, Date, DateTime, FlightId, ReservationId, Sex, StoreConfig,
    StoreError,
};

use super::manager::{Draft, Entity, EntityManager, EntityRef};
use crate::pool::{RelationList, RelationPool, Relations, SlotId, StrSpan, StringPool, StringStore};

/// A stored user.
#[derive(Clone, Debug, Default)]
pub struct User {
    id: StrSpan,
    name: StrSpan,
    passport: StrSpan,
    country_code: CountryCode,
    birth_date: Date,
    account_creation: DateTime,
    sex: Sex,
    account_status: AccountStatus,
    flights: RelationList,
    reservations: RelationList,
    valid: bool,
}

impl User {
    /// Date of birth.
    #[inline]
    pub fn birth_date(&self) -> Date {
        self.birth_date
    }

    /// When the account was created.
    #[inline]
    pub fn account_creation(&self) -> DateTime {
        self.account_creation
    }

    /// Country of residence.
    #[inline]
    pub fn country_code(&self) -> CountryCode {
        self.country_code
    }

    /// Sex.
    #[inline]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Account status.
    #[inline]
    pub fn account_status(&self) -> AccountStatus {
        self.account_status
    }

    /// Returns true for active accounts.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.account_status == AccountStatus::Active
    }

    /// Age in whole years on `today`.
    pub fn age(&self, today: Date) -> i32 {
        self.birth_date.years_until(today)
    }

    /// Head of the list of flights taken.
    #[inline]
    pub fn flights(&self) -> RelationList {
        self.flights
    }

    /// Head of the list of reservations booked.
    #[inline]
    pub fn reservations(&self) -> RelationList {
        self.reservations
    }
}

impl Entity for User {
    type Id = str;
    type Strings = StringPool;
    const KIND: &'static str = "user";

    #[inline]
    fn key<'a>(&'a self, strings: &'a StringPool) -> &'a str {
        strings.get(self.id)
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    fn invalidate(&mut self) {
        self.valid = false;
    }
}

impl<'a> EntityRef<'a, User> {
    /// User identifier.
    pub fn id(&self) -> &'a str {
        self.text(self.entity().id)
    }

    /// Full name.
    pub fn name(&self) -> &'a str {
        self.text(self.entity().name)
    }

    /// Passport number.
    pub fn passport(&self) -> &'a str {
        self.text(self.entity().passport)
    }
}

/// A user being parsed. Text buffers are reused between records.
#[derive(Clone, Debug, Default)]
pub struct UserDraft {
    /// User identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Passport number.
    pub passport: String,
    /// Country of residence.
    pub country_code: CountryCode,
    /// Date of birth.
    pub birth_date: Date,
    /// Account creation timestamp.
    pub account_creation: DateTime,
    /// Sex.
    pub sex: Sex,
    /// Account status.
    pub account_status: AccountStatus,
}

impl Draft for UserDraft {
    type Entity = User;

    fn skeleton(&self) -> User {
        User {
            country_code: self.country_code,
            birth_date: self.birth_date,
            account_creation: self.account_creation,
            sex: self.sex,
            account_status: self.account_status,
            valid: true,
            ..User::default()
        }
    }

    fn intern(&self, user: &mut User, strings: &mut StringPool) -> Result<(), StoreError> {
        user.id = strings.intern(&self.id)?;
        user.name = strings.intern(&self.name)?;
        user.passport = strings.intern(&self.passport)?;
        Ok(())
    }
}

/// Users indexed by identifier, plus the flights and reservations each user
/// is linked to.
#[derive(Clone, Debug)]
pub struct UserManager {
    users: EntityManager<User>,
    relations: RelationPool,
}

impl UserManager {
    /// Creates an empty manager sized from `config`.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            users: EntityManager::new(
                config.user_block_capacity,
                StringPool::new(config.string_block_capacity),
            ),
            relations: RelationPool::new(config.relation_block_capacity),
        }
    }

    /// Adds a user. See [`EntityManager::add`].
    pub fn add(&mut self, draft: &UserDraft) -> Result<SlotId, StoreError> {
        self.users.add(draft)
    }

    /// Looks up a user by identifier.
    pub fn get_by_id(&self, id: &str) -> Option<EntityRef<'_, User>> {
        self.users.get_by_id(id)
    }

    /// Returns true if a valid user has this identifier.
    pub fn contains(&self, id: &str) -> bool {
        self.users.slot_of(id).is_some()
    }

    /// Number of valid users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if there is no valid user.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// The underlying entity manager.
    pub fn entities(&self) -> &EntityManager<User> {
        &self.users
    }

    /// The pool holding every user's relation nodes.
    pub fn relations(&self) -> &RelationPool {
        &self.relations
    }

    fn owner<'m>(
        users: &'m mut EntityManager<User>,
        user_id: &str,
    ) -> Result<&'m mut User, StoreError> {
        users
            .get_by_id_mut(user_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: User::KIND,
                id: user_id.to_owned(),
            })
    }

    /// Records that `user_id` took `flight`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if there is no such user, or an allocation
    /// failure from the relation pool.
    pub fn add_flight(&mut self, user_id: &str, flight: FlightId) -> Result<(), StoreError> {
        let user = Self::owner(&mut self.users, user_id)?;
        self.relations.prepend(&mut user.flights, flight.get())
    }

    /// Records that `user_id` booked `reservation`.
    pub fn add_reservation(
        &mut self,
        user_id: &str,
        reservation: ReservationId,
    ) -> Result<(), StoreError> {
        let user = Self::owner(&mut self.users, user_id)?;
        self.relations
            .prepend(&mut user.reservations, reservation.get())
    }

    /// Flights taken by `user`, most recent first.
    pub fn flights_of(&self, user: &User) -> impl Iterator<Item = FlightId> + '_ {
        self.relations.iter(user.flights).map(FlightId)
    }

    /// Reservations booked by `user`, most recent first.
    pub fn reservations_of(&self, user: &User) -> impl Iterator<Item = ReservationId> + '_ {
        self.relations.iter(user.reservations).map(ReservationId)
    }

    /// Flights taken by the user with identifier `id`, or `None` if there is
    /// no such user.
    pub fn get_flights_by_id(&self, id: &str) -> Option<impl Iterator<Item = FlightId> + '_> {
        let user = self.users.get_by_id(id)?;
        Some(self.flights_of(user.entity()))
    }

    /// Reservations booked by the user with identifier `id`, or `None` if
    /// there is no such user.
    pub fn get_reservations_by_id(
        &self,
        id: &str,
    ) -> Option<impl Iterator<Item = ReservationId> + '_> {
        let user = self.users.get_by_id(id)?;
        Some(self.reservations_of(user.entity()))
    }

    /// Iterates over valid users in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityRef<'_, User>> + '_ {
        self.users.iter()
    }

    /// Calls `f` on every valid user until it breaks.
    pub fn visit<B, F>(&self, f: F) -> ControlFlow<B>
    where
        F: FnMut(EntityRef<'_, User>) -> ControlFlow<B>,
    {
        self.users.visit(f)
    }

    /// Iterates over valid users together with their flight lists.
    pub fn iter_with_flights(
        &self,
    ) -> impl Iterator<Item = (EntityRef<'_, User>, Relations<'_>)> + '_ {
        self.users
            .iter()
            .map(move |user| (user, self.relations.iter(user.flights)))
    }

    /// Iterates over valid users together with both relation lists.
    pub fn iter_with_relations(
        &self,
    ) -> impl Iterator<Item = (EntityRef<'_, User>, Relations<'_>, Relations<'_>)> + '_ {
        self.users.iter().map(move |user| {
            (
                user,
                self.relations.iter(user.flights),
                self.relations.iter(user.reservations),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: &str, name: &str) -> UserDraft {
        UserDraft {
            id: id.into(),
            name: name.into(),
            passport: format!("P{id}"),
            country_code: "PT".parse().unwrap(),
            birth_date: "1990/04/12".parse().unwrap(),
            account_creation: "2015/01/02 10:00:00".parse().unwrap(),
            ..UserDraft::default()
        }
    }

    fn manager() -> UserManager {
        UserManager::new(&StoreConfig::default().with_block_capacity(2))
    }

    #[test]
    fn stores_text_and_scalars() {
        let mut users = manager();
        users.add(&draft("JéssiTavares910", "Jéssica Tavares")).unwrap();

        let user = users.get_by_id("JéssiTavares910").unwrap();
        assert_eq!(user.id(), "JéssiTavares910");
        assert_eq!(user.name(), "Jéssica Tavares");
        assert_eq!(user.passport(), "PJéssiTavares910");
        assert_eq!(user.country_code().to_string(), "PT");
        assert_eq!(user.age("2023/10/01".parse().unwrap()), 33);
        assert!(user.is_active());
    }

    #[test]
    fn relations_are_most_recent_first() {
        let mut users = manager();
        users.add(&draft("a", "A")).unwrap();
        users.add(&draft("b", "B")).unwrap();
        for f in 1..=3 {
            users.add_flight("a", FlightId(f)).unwrap();
        }
        users.add_reservation("b", ReservationId(7)).unwrap();

        let flights: Vec<_> = users.get_flights_by_id("a").unwrap().collect();
        assert_eq!(flights, [FlightId(3), FlightId(2), FlightId(1)]);
        assert_eq!(users.get_flights_by_id("b").unwrap().count(), 0);
        let reservations: Vec<_> = users.get_reservations_by_id("b").unwrap().collect();
        assert_eq!(reservations, [ReservationId(7)]);
        assert!(users.get_flights_by_id("nobody").is_none());
    }

    #[test]
    fn relation_to_missing_user_fails() {
        let mut users = manager();
        let err = users.add_flight("ghost", FlightId(1)).unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                kind: "user",
                id: "ghost".into()
            }
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn iterate_with_relations() {
        let mut users = manager();
        for id in ["a", "b", "c"] {
            users.add(&draft(id, id)).unwrap();
        }
        users.add_flight("b", FlightId(10)).unwrap();
        users.add_reservation("c", ReservationId(20)).unwrap();
        users.add_reservation("c", ReservationId(21)).unwrap();

        let summary: Vec<(String, usize, usize)> = users
            .iter_with_relations()
            .map(|(u, f, r)| (u.id().to_owned(), f.count(), r.count()))
            .collect();
        assert_eq!(
            summary,
            [
                ("a".to_owned(), 0, 0),
                ("b".to_owned(), 1, 0),
                ("c".to_owned(), 0, 2)
            ]
        );

        let with_flights: Vec<usize> = users.iter_with_flights().map(|(_, f)| f.count()).collect();
        assert_eq!(with_flights, [0, 1, 0]);
    }

    #[test]
    fn clone_keeps_relations() {
        let mut users = manager();
        users.add(&draft("a", "A")).unwrap();
        users.add_flight("a", FlightId(1)).unwrap();

        let mut copy = users.clone();
        copy.add_flight("a", FlightId(2)).unwrap();

        assert_eq!(users.get_flights_by_id("a").unwrap().count(), 1);
        assert_eq!(copy.get_flights_by_id("a").unwrap().count(), 2);
        assert_eq!(copy.get_by_id("a").unwrap().name(), "A");
    }
}
