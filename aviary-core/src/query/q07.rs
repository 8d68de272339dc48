//! Query 7: the N airports with the largest median departure delay.

use core::cmp::Reverse;

use aviary_types::{parse_positive, AirportCode, ValueError};
use rustc_hash::FxHashMap;

use super::{expect_arguments, Query, QueryWriter};
use crate::store::Database;

/// Median departure delay of every origin airport, largest first, ties by
/// airport code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirportDelays {
    medians: Vec<(AirportCode, i64)>,
}

impl AirportDelays {
    /// Computes the medians over every valid flight of `db`.
    pub fn compute(db: &Database) -> Self {
        let mut delays: FxHashMap<AirportCode, Vec<i64>> = FxHashMap::default();
        for flight in db.flights().iter() {
            delays
                .entry(flight.origin())
                .or_default()
                .push(flight.departure_delay());
        }

        let mut medians: Vec<(AirportCode, i64)> = delays
            .into_iter()
            .map(|(airport, mut delays)| (airport, median(&mut delays)))
            .collect();
        medians.sort_unstable_by_key(|&(airport, median)| (Reverse(median), airport));
        Self { medians }
    }

    /// Airports and medians in rank order.
    pub fn ranked(&self) -> &[(AirportCode, i64)] {
        &self.medians
    }
}

/// Median of a non-empty slice, halves rounded away from zero.
fn median(values: &mut [i64]) -> i64 {
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        ((values[mid - 1] + values[mid]) as f64 / 2.0).round() as i64
    } else {
        values[mid]
    }
}

/// Ranks airports by median departure delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopDelayedAirports;

impl Query for TopDelayedAirports {
    type Args = usize;
    type Stats = AirportDelays;

    fn parse_arguments(&self, args: &[&str]) -> Result<usize, ValueError> {
        expect_arguments(args, 1)?;
        let n = parse_positive(args[0], "N")?;
        Ok(usize::try_from(n).unwrap_or(usize::MAX))
    }

    fn generate_statistics(&self, db: &Database, _: &[&usize]) -> Option<AirportDelays> {
        Some(AirportDelays::compute(db))
    }

    fn execute(
        &self,
        _: &Database,
        stats: Option<&AirportDelays>,
        n: &usize,
        out: &mut QueryWriter,
    ) {
        let Some(stats) = stats else {
            return;
        };
        for (airport, median) in stats.ranked().iter().take(*n) {
            out.begin_object();
            out.field("name", airport);
            out.field("median", median);
        }
    }
}
