//! Query 1: summary of a user, flight or reservation.

use aviary_types::{Date, FlightId, ReservationId, ValueError};

use super::{expect_arguments, Query, QueryWriter};
use crate::store::Database;

/// What a query 1 instance looks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryTarget {
    /// A user, by identifier.
    User(String),
    /// A flight.
    Flight(FlightId),
    /// A reservation.
    Reservation(ReservationId),
}

impl SummaryTarget {
    /// Decides the entity kind from the shape of the identifier: all digits
    /// is a flight, `Book` and digits is a reservation, anything else a user.
    pub fn classify(id: &str) -> Self {
        if let Ok(flight) = id.parse::<FlightId>() {
            SummaryTarget::Flight(flight)
        } else if let Ok(reservation) = id.parse::<ReservationId>() {
            SummaryTarget::Reservation(reservation)
        } else {
            SummaryTarget::User(id.to_owned())
        }
    }
}

/// Summarizes one entity. Writes nothing for unknown entities and for
/// inactive users.
#[derive(Debug, Clone, Copy)]
pub struct EntitySummary {
    today: Date,
}

impl EntitySummary {
    /// Creates the query; `today` is the date user ages are computed against.
    pub fn new(today: Date) -> Self {
        Self { today }
    }

    fn user(&self, db: &Database, id: &str, out: &mut QueryWriter) {
        let users = db.users();
        let Some(user) = users.get_by_id(id) else {
            return;
        };
        if !user.is_active() {
            return;
        }

        let flights = users.flights_of(user.entity()).count();
        let mut reservations = 0usize;
        let mut total_spent = 0.0f64;
        for id in users.reservations_of(user.entity()) {
            reservations += 1;
            if let Some(r) = db.reservations().get_by_id(id) {
                total_spent += r.total_price();
            }
        }

        out.begin_object();
        out.field("name", user.name());
        out.field("sex", user.sex());
        out.field("age", user.age(self.today));
        out.field("country_code", user.country_code());
        out.field("passport", user.passport());
        out.field("number_of_flights", flights);
        out.field("number_of_reservations", reservations);
        out.field("total_spent", format_args!("{total_spent:.3}"));
    }

    fn flight(db: &Database, id: FlightId, out: &mut QueryWriter) {
        let Some(flight) = db.flights().get_by_id(id) else {
            return;
        };
        out.begin_object();
        out.field("airline", flight.airline());
        out.field("plane_model", flight.plane_model());
        out.field("origin", flight.origin());
        out.field("destination", flight.destination());
        out.field("schedule_departure_date", flight.schedule_departure());
        out.field("schedule_arrival_date", flight.schedule_arrival());
        out.field("passengers", flight.number_of_passengers());
        out.field("delay", flight.departure_delay());
    }

    fn reservation(db: &Database, id: ReservationId, out: &mut QueryWriter) {
        let Some(r) = db.reservations().get_by_id(id) else {
            return;
        };
        out.begin_object();
        out.field("hotel_id", r.hotel_id());
        out.field("hotel_name", r.hotel_name());
        out.field("hotel_stars", r.hotel_stars());
        out.field("begin_date", r.begin_date());
        out.field("end_date", r.end_date());
        out.field("includes_breakfast", r.includes_breakfast());
        out.field("nights", r.nights());
        out.field("total_price", format_args!("{:.3}", r.total_price()));
    }
}

impl Query for EntitySummary {
    type Args = SummaryTarget;
    type Stats = ();

    fn parse_arguments(&self, args: &[&str]) -> Result<SummaryTarget, ValueError> {
        expect_arguments(args, 1)?;
        Ok(SummaryTarget::classify(args[0]))
    }

    fn execute(&self, db: &Database, _: Option<&()>, args: &SummaryTarget, out: &mut QueryWriter) {
        match args {
            SummaryTarget::User(id) => self.user(db, id, out),
            SummaryTarget::Flight(id) => Self::flight(db, *id, out),
            SummaryTarget::Reservation(id) => Self::reservation(db, *id, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FlightDraft, ReservationDraft, UserDraft};
    use aviary_types::{AccountStatus, HotelId, IncludesBreakfast, Sex};

    fn database() -> Database {
        let mut db = Database::default();
        for (id, status) in [("ana", AccountStatus::Active), ("rui", AccountStatus::Inactive)] {
            db.users_mut()
                .add(&UserDraft {
                    id: id.into(),
                    name: "Ana Silva".into(),
                    passport: "PT123".into(),
                    country_code: "PT".parse().unwrap(),
                    sex: Sex::Female,
                    birth_date: "1990/10/02".parse().unwrap(),
                    account_status: status,
                    ..UserDraft::default()
                })
                .unwrap();
        }
        db.flights_mut()
            .add(&FlightDraft {
                id: FlightId(3),
                airline: "TAP".into(),
                plane_model: "A321".into(),
                total_seats: 100,
                origin: "LIS".parse().unwrap(),
                destination: "OPO".parse().unwrap(),
                schedule_departure: "2023/01/01 10:00:00".parse().unwrap(),
                schedule_arrival: "2023/01/01 11:00:00".parse().unwrap(),
                real_departure: "2023/01/01 10:01:30".parse().unwrap(),
            })
            .unwrap();
        db.users_mut().add_flight("ana", FlightId(3)).unwrap();
        db.flights_mut().add_passenger(FlightId(3)).unwrap();

        for id in [1, 2] {
            db.reservations_mut()
                .add(&ReservationDraft {
                    id: ReservationId(id),
                    user_id: "ana".into(),
                    hotel_id: HotelId(5),
                    hotel_name: "Ibis".into(),
                    hotel_stars: 3,
                    city_tax: 5,
                    begin_date: "2023/02/01".parse().unwrap(),
                    end_date: "2023/02/03".parse().unwrap(),
                    price_per_night: 40,
                    includes_breakfast: IncludesBreakfast::Included,
                    rating: None,
                })
                .unwrap();
            db.users_mut().add_reservation("ana", ReservationId(id)).unwrap();
        }
        db
    }

    fn run(db: &Database, target: &str, formatted: bool) -> String {
        let query = EntitySummary::new(Date::new(2023, 10, 1).unwrap());
        let args = query.parse_arguments(&[target]).unwrap();
        let mut out = QueryWriter::new(formatted);
        query.execute(db, None, &args, &mut out);
        out.finish()
    }

    #[test]
    fn classification() {
        assert_eq!(SummaryTarget::classify("0000000003"), SummaryTarget::Flight(FlightId(3)));
        assert_eq!(
            SummaryTarget::classify("Book0000000001"),
            SummaryTarget::Reservation(ReservationId(1))
        );
        assert_eq!(SummaryTarget::classify("JéssiTavares910"), SummaryTarget::User("JéssiTavares910".into()));
    }

    #[test]
    fn user_summary() {
        let db = database();
        assert_eq!(run(&db, "ana", false), "Ana Silva;F;32;PT;PT123;1;2;168.000\n");
        assert_eq!(run(&db, "rui", false), "", "inactive users are hidden");
        assert_eq!(run(&db, "nobody", false), "");
    }

    #[test]
    fn flight_summary() {
        let db = database();
        assert_eq!(
            run(&db, "3", true),
            "--- 1 ---\nairline: TAP\nplane_model: A321\norigin: LIS\ndestination: OPO\n\
             schedule_departure_date: 2023/01/01 10:00:00\nschedule_arrival_date: 2023/01/01 11:00:00\n\
             passengers: 1\ndelay: 90\n"
        );
    }

    #[test]
    fn reservation_summary() {
        let db = database();
        assert_eq!(
            run(&db, "Book0000000002", false),
            "HTL5;Ibis;3;2023/02/01;2023/02/03;True;2;84.000\n"
        );
    }
}
