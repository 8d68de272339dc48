//! Hotel reservations.

use core::ops::ControlFlow;

use aviary_types::{Date, HotelId, IncludesBreakfast, ReservationId, StoreConfig, StoreError};

use super::manager::{Draft, Entity, EntityManager, EntityRef};
use crate::pool::{DedupStringPool, SlotId, StrSpan, StringStore};

/// A stored reservation.
#[derive(Clone, Debug, Default)]
pub struct Reservation {
    id: ReservationId,
    hotel_id: HotelId,
    user_id: StrSpan,
    hotel_name: StrSpan,
    begin_date: Date,
    end_date: Date,
    price_per_night: u32,
    city_tax: u32,
    hotel_stars: u8,
    rating: Option<u8>,
    includes_breakfast: IncludesBreakfast,
    valid: bool,
}

impl Reservation {
    /// Reservation identifier.
    #[inline]
    pub fn id(&self) -> ReservationId {
        self.id
    }

    /// Hotel identifier.
    #[inline]
    pub fn hotel_id(&self) -> HotelId {
        self.hotel_id
    }

    /// Hotel star rating, 1 to 5.
    #[inline]
    pub fn hotel_stars(&self) -> u8 {
        self.hotel_stars
    }

    /// City tax, in percent of the base price.
    #[inline]
    pub fn city_tax(&self) -> u32 {
        self.city_tax
    }

    /// First night.
    #[inline]
    pub fn begin_date(&self) -> Date {
        self.begin_date
    }

    /// Check-out day.
    #[inline]
    pub fn end_date(&self) -> Date {
        self.end_date
    }

    /// Price of one night before tax.
    #[inline]
    pub fn price_per_night(&self) -> u32 {
        self.price_per_night
    }

    /// Whether breakfast is included.
    #[inline]
    pub fn includes_breakfast(&self) -> IncludesBreakfast {
        self.includes_breakfast
    }

    /// User rating, if the user left one.
    #[inline]
    pub fn rating(&self) -> Option<u8> {
        self.rating
    }

    /// Number of nights between the begin and end dates.
    pub fn nights(&self) -> i64 {
        self.end_date.days_since(self.begin_date)
    }

    /// Total price with city tax.
    pub fn total_price(&self) -> f64 {
        let base = self.price_per_night as f64 * self.nights() as f64;
        base + base / 100.0 * self.city_tax as f64
    }
}

impl Entity for Reservation {
    type Id = ReservationId;
    type Strings = DedupStringPool;
    const KIND: &'static str = "reservation";

    #[inline]
    fn key<'a>(&'a self, _: &'a DedupStringPool) -> &'a ReservationId {
        &self.id
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

impl<'a> EntityRef<'a, Reservation> {
    /// Identifier of the user who booked.
    pub fn user_id(&self) -> &'a str {
        self.text(self.entity().user_id)
    }

    /// Hotel name.
    pub fn hotel_name(&self) -> &'a str {
        self.text(self.entity().hotel_name)
    }
}

/// A reservation being parsed.
#[derive(Clone, Debug, Default)]
pub struct ReservationDraft {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Identifier of the user who booked.
    pub user_id: String,
    /// Hotel identifier.
    pub hotel_id: HotelId,
    /// Hotel name.
    pub hotel_name: String,
    /// Hotel star rating.
    pub hotel_stars: u8,
    /// City tax in percent.
    pub city_tax: u32,
    /// First night.
    pub begin_date: Date,
    /// Check-out day.
    pub end_date: Date,
    /// Price of one night.
    pub price_per_night: u32,
    /// Whether breakfast is included.
    pub includes_breakfast: IncludesBreakfast,
    /// User rating.
    pub rating: Option<u8>,
}

impl Draft for ReservationDraft {
    type Entity = Reservation;

    fn skeleton(&self) -> Reservation {
        Reservation {
            id: self.id,
            hotel_id: self.hotel_id,
            begin_date: self.begin_date,
            end_date: self.end_date,
            price_per_night: self.price_per_night,
            city_tax: self.city_tax,
            hotel_stars: self.hotel_stars,
            rating: self.rating,
            includes_breakfast: self.includes_breakfast,
            valid: true,
            ..Reservation::default()
        }
    }

    fn intern(
        &self,
        reservation: &mut Reservation,
        strings: &mut DedupStringPool,
    ) -> Result<(), StoreError> {
        reservation.user_id = strings.intern(&self.user_id)?;
        reservation.hotel_name = strings.intern(&self.hotel_name)?;
        Ok(())
    }
}

/// Reservations indexed by identifier.
#[derive(Clone, Debug)]
pub struct ReservationManager {
    reservations: EntityManager<Reservation>,
}

impl ReservationManager {
    /// Creates an empty manager sized from `config`.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            reservations: EntityManager::new(
                config.reservation_block_capacity,
                DedupStringPool::new(config.string_block_capacity),
            ),
        }
    }

    /// Adds a reservation. See [`EntityManager::add`].
    pub fn add(&mut self, draft: &ReservationDraft) -> Result<SlotId, StoreError> {
        self.reservations.add(draft)
    }

    /// Looks up a reservation by identifier.
    pub fn get_by_id(&self, id: ReservationId) -> Option<EntityRef<'_, Reservation>> {
        self.reservations.get_by_id(&id)
    }

    /// Number of valid reservations.
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    /// Returns true if there is no valid reservation.
    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// The underlying entity manager.
    pub fn entities(&self) -> &EntityManager<Reservation> {
        &self.reservations
    }

    /// Iterates over valid reservations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityRef<'_, Reservation>> + '_ {
        self.reservations.iter()
    }

    /// Calls `f` on every valid reservation until it breaks.
    pub fn visit<B, F>(&self, f: F) -> ControlFlow<B>
    where
        F: FnMut(EntityRef<'_, Reservation>) -> ControlFlow<B>,
    {
        self.reservations.visit(f)
    }
}
