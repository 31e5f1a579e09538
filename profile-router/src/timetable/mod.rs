//! Timetable data-source contracts.
//!
//! The routing core never sees a concrete storage format; it consumes the
//! index-based traits defined here. All ids are dense integers in
//! `[0, size)`, and out-of-range access panics the way slice indexing does.
//!
//! Stop ids share one space: ids below `stations().size()` are station ids,
//! the rest are platform ids offset by the station count. The
//! [`Timetable::station_id`] helper collapses either kind to its station.

mod memory;

pub use memory::{InMemoryTimetable, StopSpec, TimetableBuilder, TimetableError};

use chrono::NaiveDate;

use crate::journey::Vehicle;
use crate::pack::PackedRange;

/// The stations of the network.
pub trait Stations {
    /// Returns the number of stations.
    fn size(&self) -> usize;

    /// Returns the name of the given station.
    fn name(&self, id: usize) -> &str;

    /// Returns the longitude of the given station, in degrees.
    fn longitude(&self, id: usize) -> f64;

    /// Returns the latitude of the given station, in degrees.
    fn latitude(&self, id: usize) -> f64;
}

/// The platforms of the network. Platform `p` is stop id
/// `stations().size() + p`.
pub trait Platforms {
    /// Returns the number of platforms.
    fn size(&self) -> usize;

    /// Returns the platform's name (e.g. "3" or "B"), without the station
    /// name.
    fn name(&self, id: usize) -> &str;

    /// Returns the station this platform belongs to.
    fn station_id(&self, id: usize) -> usize;
}

/// The connections of one service day.
///
/// # Contract
///
/// Connections are indexed in **non-increasing departure-time order**: index
/// 0 is the latest-departing connection. The scan algorithm relies on this;
/// [`connections_in_scan_order`] checks it.
pub trait Connections {
    /// Returns the number of connections.
    fn size(&self) -> usize;

    /// Returns the stop id the connection departs from.
    fn dep_stop_id(&self, id: usize) -> usize;

    /// Returns the departure minute of day.
    fn dep_mins(&self, id: usize) -> i32;

    /// Returns the stop id the connection arrives at.
    fn arr_stop_id(&self, id: usize) -> usize;

    /// Returns the arrival minute of day.
    fn arr_mins(&self, id: usize) -> i32;

    /// Returns the trip the connection belongs to.
    fn trip_id(&self, id: usize) -> usize;

    /// Returns the position of the connection within its trip, starting
    /// at 0.
    fn trip_pos(&self, id: usize) -> u32;

    /// Returns the next connection of the same trip, wrapping from the last
    /// connection back to the first.
    fn next_connection_id(&self, id: usize) -> usize;
}

/// The footpaths (transfers) of the network, grouped contiguously by
/// arrival station.
pub trait Transfers {
    /// Returns the number of transfers.
    fn size(&self) -> usize;

    /// Returns the station the transfer starts from.
    fn dep_station_id(&self, id: usize) -> usize;

    /// Returns the walking duration in minutes.
    fn minutes(&self, id: usize) -> i32;

    /// Returns the interval of transfer indices arriving at the given
    /// station.
    fn arriving_at(&self, station_id: usize) -> PackedRange;

    /// Returns the walking minutes between two stations, or `None` if no
    /// direct footpath exists.
    fn minutes_between(&self, dep_station_id: usize, arr_station_id: usize) -> Option<i32>;
}

/// The trips of one service day.
pub trait Trips {
    /// Returns the number of trips.
    fn size(&self) -> usize;

    /// Returns the route the trip belongs to.
    fn route_id(&self, id: usize) -> usize;

    /// Returns the headsign destination of the trip.
    fn destination(&self, id: usize) -> &str;
}

/// The routes of the network.
pub trait Routes {
    /// Returns the number of routes.
    fn size(&self) -> usize;

    /// Returns the kind of vehicle serving the route.
    fn vehicle(&self, id: usize) -> Vehicle;

    /// Returns the route's name (e.g. a line number).
    fn name(&self, id: usize) -> &str;
}

/// A complete timetable: the data sources bundled, plus stop-id helpers.
pub trait Timetable {
    type Stations: Stations;
    type Platforms: Platforms;
    type Transfers: Transfers;
    type Trips: Trips;
    type Routes: Routes;
    type Connections: Connections;

    fn stations(&self) -> &Self::Stations;
    fn platforms(&self) -> &Self::Platforms;
    fn transfers(&self) -> &Self::Transfers;
    fn routes(&self) -> &Self::Routes;

    /// Returns the trips running on the given date.
    fn trips_for(&self, date: NaiveDate) -> &Self::Trips;

    /// Returns the connections of the given date, in scan order.
    fn connections_for(&self, date: NaiveDate) -> &Self::Connections;

    /// Returns true if the stop id denotes a station (not a platform).
    fn is_station_id(&self, stop_id: usize) -> bool {
        stop_id < self.stations().size()
    }

    /// Returns the station a stop belongs to: the stop itself for a
    /// station id, the owning station for a platform id.
    fn station_id(&self, stop_id: usize) -> usize {
        if self.is_station_id(stop_id) {
            stop_id
        } else {
            self.platforms().station_id(stop_id - self.stations().size())
        }
    }

    /// Returns the platform name of a stop, or `None` for a plain station.
    fn platform_name(&self, stop_id: usize) -> Option<&str> {
        if self.is_station_id(stop_id) {
            None
        } else {
            Some(self.platforms().name(stop_id - self.stations().size()))
        }
    }
}

/// Returns true if the connections satisfy their ordering contract:
/// departure minutes never increase with the index.
pub fn connections_in_scan_order(connections: &impl Connections) -> bool {
    (1..connections.size()).all(|id| connections.dep_mins(id - 1) >= connections.dep_mins(id))
}
