//! Per-station Pareto fronts for one date and destination.

use chrono::NaiveDate;

use crate::front::{ParetoFront, ParetoFrontBuilder};

/// The completed result of a scan: for every station, the Pareto-optimal
/// ways of reaching the destination station on the given date.
///
/// A profile owns its fronts and is immutable; it can be cached and read
/// from multiple threads at once.
#[derive(Debug, Clone)]
pub struct Profile {
    date: NaiveDate,
    arr_station_id: usize,
    station_fronts: Vec<ParetoFront>,
}

impl Profile {
    /// Returns the date the profile was computed for.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the destination station of the profile.
    pub fn arr_station_id(&self) -> usize {
        self.arr_station_id
    }

    /// Returns the number of stations covered.
    pub fn station_count(&self) -> usize {
        self.station_fronts.len()
    }

    /// Returns the front of the given station (empty if the destination is
    /// unreachable from it).
    ///
    /// # Panics
    ///
    /// Panics if `station_id` is out of range.
    pub fn for_station(&self, station_id: usize) -> &ParetoFront {
        &self.station_fronts[station_id]
    }
}

/// Mutable scan state: one front builder per station and one per trip,
/// indexed by their dense ids.
///
/// The trip builders are scratch state for the scan; [`build`] discards
/// them and freezes only the station fronts.
///
/// [`build`]: ProfileBuilder::build
#[derive(Debug)]
pub struct ProfileBuilder {
    date: NaiveDate,
    arr_station_id: usize,
    station_fronts: Vec<ParetoFrontBuilder>,
    trip_fronts: Vec<ParetoFrontBuilder>,
}

impl ProfileBuilder {
    /// Creates a builder with empty fronts for `station_count` stations and
    /// `trip_count` trips.
    pub fn new(
        date: NaiveDate,
        arr_station_id: usize,
        station_count: usize,
        trip_count: usize,
    ) -> Self {
        ProfileBuilder {
            date,
            arr_station_id,
            station_fronts: vec![ParetoFrontBuilder::new(); station_count],
            trip_fronts: vec![ParetoFrontBuilder::new(); trip_count],
        }
    }

    /// Returns the front builder of the given station.
    pub fn for_station(&self, station_id: usize) -> &ParetoFrontBuilder {
        &self.station_fronts[station_id]
    }

    /// Returns the front builder of the given station, mutably.
    pub fn for_station_mut(&mut self, station_id: usize) -> &mut ParetoFrontBuilder {
        &mut self.station_fronts[station_id]
    }

    /// Returns the front builder of the given trip.
    pub fn for_trip(&self, trip_id: usize) -> &ParetoFrontBuilder {
        &self.trip_fronts[trip_id]
    }

    /// Returns the front builder of the given trip, mutably.
    pub fn for_trip_mut(&mut self, trip_id: usize) -> &mut ParetoFrontBuilder {
        &mut self.trip_fronts[trip_id]
    }

    /// Freezes every station front into an immutable [`Profile`], dropping
    /// the per-trip scratch fronts.
    pub fn build(self) -> Profile {
        Profile {
            date: self.date,
            arr_station_id: self.arr_station_id,
            station_fronts: self
                .station_fronts
                .iter()
                .map(ParetoFrontBuilder::build)
                .collect(),
        }
    }
}
