//! In-memory record store.
//!
//! Memory Layout:
//! - Every entity kind lives in its own [`BlockPool`](crate::pool::BlockPool);
//!   entities never move once added
//! - Text fields are spans into a per-manager string store; flights and
//!   reservations deduplicate theirs
//! - Cross references (user to flights, user to reservations) are relation
//!   lists whose nodes are addressed by slot number
//!
//! Threading:
//! - The store is filled by a single thread. Once loaded it is read-only and
//!   every manager is `Send + Sync`, so queries may borrow it from several
//!   threads.

mod flight;
mod manager;
mod reservation;
mod stats;
mod user;

pub use flight::{Flight, FlightDraft, FlightManager};
pub use manager::{Draft, Entity, EntityManager, EntityRef};
pub use reservation::{Reservation, ReservationDraft, ReservationManager};
pub use stats::StoreStats;
pub use user::{User, UserDraft, UserManager};

use aviary_types::StoreConfig;

/// Users, flights and reservations.
#[derive(Clone, Debug)]
pub struct Database {
    pub(crate) users: UserManager,
    pub(crate) flights: FlightManager,
    pub(crate) reservations: ReservationManager,
    pub(crate) config: StoreConfig,
}

impl Default for Database {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl Database {
    /// Creates an empty store. Pools are allocated on first use.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            users: UserManager::new(config),
            flights: FlightManager::new(config),
            reservations: ReservationManager::new(config),
            config: config.clone(),
        }
    }

    /// Configuration the store was created with.
    #[inline(always)]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Users and their relation lists.
    #[inline(always)]
    pub fn users(&self) -> &UserManager {
        &self.users
    }

    /// Users, for modification.
    #[inline(always)]
    pub fn users_mut(&mut self) -> &mut UserManager {
        &mut self.users
    }

    /// Flights.
    #[inline(always)]
    pub fn flights(&self) -> &FlightManager {
        &self.flights
    }

    /// Flights, for modification.
    #[inline(always)]
    pub fn flights_mut(&mut self) -> &mut FlightManager {
        &mut self.flights
    }

    /// Reservations.
    #[inline(always)]
    pub fn reservations(&self) -> &ReservationManager {
        &self.reservations
    }

    /// Reservations, for modification.
    #[inline(always)]
    pub fn reservations_mut(&mut self) -> &mut ReservationManager {
        &mut self.reservations
    }
}
