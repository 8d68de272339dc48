//! Flights.

use core::ops::ControlFlow;

use aviary_types::{AirportCode, DateTime, FlightId, StoreConfig, StoreError};

use super::manager::{Draft, Entity, EntityManager, EntityRef};
use crate::pool::{DedupStringPool, SlotId, StrSpan, StringStore};

/// A stored flight.
#[derive(Clone, Debug, Default)]
pub struct Flight {
    id: FlightId,
    airline: StrSpan,
    plane_model: StrSpan,
    schedule_departure: DateTime,
    schedule_arrival: DateTime,
    real_departure: DateTime,
    origin: AirportCode,
    destination: AirportCode,
    total_seats: u64,
    number_of_passengers: u64,
    valid: bool,
}

impl Flight {
    /// Flight identifier.
    #[inline]
    pub fn id(&self) -> FlightId {
        self.id
    }

    /// Departure airport.
    #[inline]
    pub fn origin(&self) -> AirportCode {
        self.origin
    }

    /// Arrival airport.
    #[inline]
    pub fn destination(&self) -> AirportCode {
        self.destination
    }

    /// Scheduled departure.
    #[inline]
    pub fn schedule_departure(&self) -> DateTime {
        self.schedule_departure
    }

    /// Scheduled arrival.
    #[inline]
    pub fn schedule_arrival(&self) -> DateTime {
        self.schedule_arrival
    }

    /// Actual departure.
    #[inline]
    pub fn real_departure(&self) -> DateTime {
        self.real_departure
    }

    /// Seats on the plane.
    #[inline]
    pub fn total_seats(&self) -> u64 {
        self.total_seats
    }

    /// Passengers linked to this flight so far.
    ///
    /// Not checked against [`Flight::total_seats`].
    #[inline]
    pub fn number_of_passengers(&self) -> u64 {
        self.number_of_passengers
    }

    /// Seconds between scheduled and actual departure.
    pub fn departure_delay(&self) -> i64 {
        self.real_departure.seconds_since(self.schedule_departure)
    }
}

impl Entity for Flight {
    type Id = FlightId;
    type Strings = DedupStringPool;
    const KIND: &'static str = "flight";

    #[inline]
    fn key<'a>(&'a self, _: &'a DedupStringPool) -> &'a FlightId {
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

impl<'a> EntityRef<'a, Flight> {
    /// Airline name.
    pub fn airline(&self) -> &'a str {
        self.text(self.entity().airline)
    }

    /// Plane model.
    pub fn plane_model(&self) -> &'a str {
        self.text(self.entity().plane_model)
    }
}

/// A flight being parsed.
#[derive(Clone, Debug, Default)]
pub struct FlightDraft {
    /// Flight identifier.
    pub id: FlightId,
    /// Airline name.
    pub airline: String,
    /// Plane model.
    pub plane_model: String,
    /// Seats on the plane.
    pub total_seats: u64,
    /// Departure airport.
    pub origin: AirportCode,
    /// Arrival airport.
    pub destination: AirportCode,
    /// Scheduled departure.
    pub schedule_departure: DateTime,
    /// Scheduled arrival.
    pub schedule_arrival: DateTime,
    /// Actual departure.
    pub real_departure: DateTime,
}

impl Draft for FlightDraft {
    type Entity = Flight;

    fn skeleton(&self) -> Flight {
        Flight {
            id: self.id,
            total_seats: self.total_seats,
            origin: self.origin,
            destination: self.destination,
            schedule_departure: self.schedule_departure,
            schedule_arrival: self.schedule_arrival,
            real_departure: self.real_departure,
            valid: true,
            ..Flight::default()
        }
    }

    fn intern(&self, flight: &mut Flight, strings: &mut DedupStringPool) -> Result<(), StoreError> {
        flight.airline = strings.intern(&self.airline)?;
        flight.plane_model = strings.intern(&self.plane_model)?;
        Ok(())
    }
}

/// Flights indexed by identifier. Airline and plane model names are stored
/// once each.
#[derive(Clone, Debug)]
pub struct FlightManager {
    flights: EntityManager<Flight>,
}

impl FlightManager {
    /// Creates an empty manager sized from `config`.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            flights: EntityManager::new(
                config.flight_block_capacity,
                DedupStringPool::new(config.string_block_capacity),
            ),
        }
    }

    /// Adds a flight. See [`EntityManager::add`].
    pub fn add(&mut self, draft: &FlightDraft) -> Result<SlotId, StoreError> {
        self.flights.add(draft)
    }

    /// Looks up a flight by identifier.
    pub fn get_by_id(&self, id: FlightId) -> Option<EntityRef<'_, Flight>> {
        self.flights.get_by_id(&id)
    }

    /// Returns true if a valid flight has this identifier.
    pub fn contains(&self, id: FlightId) -> bool {
        self.flights.slot_of(&id).is_some()
    }

    /// Counts one more passenger on flight `id`.
    pub fn add_passenger(&mut self, id: FlightId) -> Result<(), StoreError> {
        let flight = self
            .flights
            .get_by_id_mut(&id)
            .ok_or_else(|| StoreError::NotFound {
                kind: Flight::KIND,
                id: id.to_string(),
            })?;
        flight.number_of_passengers += 1;
        Ok(())
    }

    /// Number of valid flights.
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Returns true if there is no valid flight.
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// The underlying entity manager.
    pub fn entities(&self) -> &EntityManager<Flight> {
        &self.flights
    }

    /// Iterates over valid flights in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityRef<'_, Flight>> + '_ {
        self.flights.iter()
    }

    /// Calls `f` on every valid flight until it breaks.
    pub fn visit<B, F>(&self, f: F) -> ControlFlow<B>
    where
        F: FnMut(EntityRef<'_, Flight>) -> ControlFlow<B>,
    {
        self.flights.visit(f)
    }
}
