//! In-memory timetable for a single service day.
//!
//! Production deployments are expected to plug a real data provider into
//! the [`Timetable`](super::Timetable) contract; this implementation backs
//! the test suite and the demo binary. The builder takes stations, routes,
//! trips and footpaths in any order and derives everything the scan needs:
//! the connection list in scan order, circular trip links, and transfer
//! runs grouped by arrival station.

use chrono::NaiveDate;

use super::{Connections, Platforms, Routes, Stations, Timetable, Transfers, Trips};
use crate::journey::Vehicle;
use crate::pack::{PackError, PackedRange};

/// Error returned when the builder's inputs don't form a valid timetable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    /// Referenced station was never added
    #[error("station id {0} does not exist")]
    UnknownStation(usize),

    /// Referenced platform was never added
    #[error("platform {0} does not exist")]
    UnknownPlatform(usize),

    /// Referenced route was never added
    #[error("route id {0} does not exist")]
    UnknownRoute(usize),

    /// A trip needs at least two calls to produce a connection
    #[error("trip {trip} has {calls} calls, need at least 2")]
    TripTooShort { trip: usize, calls: usize },

    /// A trip's call times go backwards
    #[error("trip {trip} is not chronological at call {call}")]
    NonChronologicalTrip { trip: usize, call: usize },

    /// A packed index interval overflowed its fields
    #[error(transparent)]
    Pack(#[from] PackError),
}

/// A stop reference used while building: either a plain station or a
/// platform added earlier. Platform stop ids are only assigned at build
/// time, once the station count is final.
#[derive(Debug, Clone, Copy)]
pub enum StopSpec {
    Station(usize),
    Platform(usize),
}

#[derive(Debug, Clone)]
struct CallData {
    stop: StopSpec,
    arr_mins: i32,
    dep_mins: i32,
}

#[derive(Debug, Clone)]
struct TripData {
    route_id: usize,
    destination: String,
    calls: Vec<CallData>,
}

/// Builder for an [`InMemoryTimetable`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use profile_router::journey::Vehicle;
/// use profile_router::timetable::{StopSpec, TimetableBuilder};
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// let mut builder = TimetableBuilder::new(date);
/// let lausanne = builder.station("Lausanne", 6.629, 46.517);
/// let geneva = builder.station("Genève", 6.142, 46.210);
/// let ir = builder.route("IR 90", Vehicle::Train);
/// builder.trip(
///     ir,
///     "Genève-Aéroport",
///     &[
///         (StopSpec::Station(lausanne), 600, 600),
///         (StopSpec::Station(geneva), 636, 636),
///     ],
/// );
/// let timetable = builder.build().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TimetableBuilder {
    date: NaiveDate,
    stations: Vec<(String, f64, f64)>,
    platforms: Vec<(String, usize)>,
    routes: Vec<(String, Vehicle)>,
    trips: Vec<TripData>,
    transfers: Vec<(usize, usize, i32)>,
}

impl TimetableBuilder {
    /// Creates a builder for the given service day.
    pub fn new(date: NaiveDate) -> Self {
        TimetableBuilder {
            date,
            stations: Vec::new(),
            platforms: Vec::new(),
            routes: Vec::new(),
            trips: Vec::new(),
            transfers: Vec::new(),
        }
    }

    /// Adds a station, returning its id.
    pub fn station(&mut self, name: &str, longitude: f64, latitude: f64) -> usize {
        self.stations.push((name.to_string(), longitude, latitude));
        self.stations.len() - 1
    }

    /// Adds a platform of a station, returning its platform index. The
    /// platform's stop id is assigned at build time; see
    /// [`InMemoryTimetable::platform_stop_id`].
    pub fn platform(&mut self, name: &str, station_id: usize) -> usize {
        self.platforms.push((name.to_string(), station_id));
        self.platforms.len() - 1
    }

    /// Adds a route, returning its id.
    pub fn route(&mut self, name: &str, vehicle: Vehicle) -> usize {
        self.routes.push((name.to_string(), vehicle));
        self.routes.len() - 1
    }

    /// Adds a trip calling at the given stops, returning its id.
    ///
    /// Each call is `(stop, arrival minute, departure minute)`; the first
    /// call's arrival and the last call's departure are never read.
    pub fn trip(
        &mut self,
        route_id: usize,
        destination: &str,
        calls: &[(StopSpec, i32, i32)],
    ) -> usize {
        self.trips.push(TripData {
            route_id,
            destination: destination.to_string(),
            calls: calls
                .iter()
                .map(|&(stop, arr_mins, dep_mins)| CallData {
                    stop,
                    arr_mins,
                    dep_mins,
                })
                .collect(),
        });
        self.trips.len() - 1
    }

    /// Adds a footpath between two stations.
    pub fn transfer(&mut self, dep_station_id: usize, arr_station_id: usize, minutes: i32) {
        self.transfers.push((dep_station_id, arr_station_id, minutes));
    }

    /// Validates the inputs and assembles the timetable.
    ///
    /// Beyond the per-id checks this derives the scan-critical structure:
    /// connections sorted by departure minute descending, circular
    /// next-connection links per trip, transfers grouped contiguously by
    /// arrival station, and a zero-minute self-transfer for every station
    /// that lacks one (the scan's propagation step relies on it).
    pub fn build(self) -> Result<InMemoryTimetable, TimetableError> {
        let station_count = self.stations.len();
        let platform_count = self.platforms.len();

        for &(_, station_id) in &self.platforms {
            if station_id >= station_count {
                return Err(TimetableError::UnknownStation(station_id));
            }
        }

        let resolve = |spec: StopSpec| -> Result<usize, TimetableError> {
            match spec {
                StopSpec::Station(id) if id < station_count => Ok(id),
                StopSpec::Station(id) => Err(TimetableError::UnknownStation(id)),
                StopSpec::Platform(p) if p < platform_count => Ok(station_count + p),
                StopSpec::Platform(p) => Err(TimetableError::UnknownPlatform(p)),
            }
        };

        struct RawConnection {
            dep_stop: usize,
            dep_mins: i32,
            arr_stop: usize,
            arr_mins: i32,
            trip_id: usize,
            trip_pos: u32,
        }

        let mut raw: Vec<RawConnection> = Vec::new();
        for (trip_id, trip) in self.trips.iter().enumerate() {
            if trip.route_id >= self.routes.len() {
                return Err(TimetableError::UnknownRoute(trip.route_id));
            }
            if trip.calls.len() < 2 {
                return Err(TimetableError::TripTooShort {
                    trip: trip_id,
                    calls: trip.calls.len(),
                });
            }
            for (call, data) in trip.calls.iter().enumerate().skip(1) {
                if call + 1 < trip.calls.len() && data.dep_mins < data.arr_mins {
                    return Err(TimetableError::NonChronologicalTrip { trip: trip_id, call });
                }
            }
            for (pos, pair) in trip.calls.windows(2).enumerate() {
                if pair[1].arr_mins < pair[0].dep_mins {
                    return Err(TimetableError::NonChronologicalTrip {
                        trip: trip_id,
                        call: pos + 1,
                    });
                }
                raw.push(RawConnection {
                    dep_stop: resolve(pair[0].stop)?,
                    dep_mins: pair[0].dep_mins,
                    arr_stop: resolve(pair[1].stop)?,
                    arr_mins: pair[1].arr_mins,
                    trip_id,
                    trip_pos: pos as u32,
                });
            }
        }

        // Scan order: latest departure first.
        raw.sort_by(|a, b| b.dep_mins.cmp(&a.dep_mins));

        let mut by_trip: Vec<Vec<usize>> = vec![Vec::new(); self.trips.len()];
        for (id, connection) in raw.iter().enumerate() {
            by_trip[connection.trip_id].push(id);
        }
        let mut next = vec![0usize; raw.len()];
        for ids in &mut by_trip {
            ids.sort_by_key(|&id| raw[id].trip_pos);
            for (k, &id) in ids.iter().enumerate() {
                next[id] = ids[(k + 1) % ids.len()];
            }
        }

        let mut transfers = self.transfers;
        for &(dep, arr, _) in &transfers {
            if dep >= station_count {
                return Err(TimetableError::UnknownStation(dep));
            }
            if arr >= station_count {
                return Err(TimetableError::UnknownStation(arr));
            }
        }
        for station in 0..station_count {
            if !transfers
                .iter()
                .any(|&(dep, arr, _)| dep == station && arr == station)
            {
                transfers.push((station, station, 0));
            }
        }
        transfers.sort_by_key(|&(_, arr, _)| arr);

        let mut arriving = vec![PackedRange::EMPTY; station_count];
        let mut start = 0;
        while start < transfers.len() {
            let arr = transfers[start].1;
            let mut end = start;
            while end < transfers.len() && transfers[end].1 == arr {
                end += 1;
            }
            arriving[arr] = PackedRange::new(start, end)?;
            start = end;
        }

        Ok(InMemoryTimetable {
            date: self.date,
            stations: MemoryStations {
                records: self.stations,
            },
            platforms: MemoryPlatforms {
                records: self.platforms,
            },
            routes: MemoryRoutes {
                records: self.routes,
            },
            trips: MemoryTrips {
                records: self
                    .trips
                    .into_iter()
                    .map(|t| (t.route_id, t.destination))
                    .collect(),
            },
            transfers: MemoryTransfers {
                records: transfers,
                arriving,
            },
            connections: MemoryConnections {
                records: raw
                    .iter()
                    .map(|c| ConnectionRecord {
                        dep_stop: c.dep_stop,
                        dep_mins: c.dep_mins,
                        arr_stop: c.arr_stop,
                        arr_mins: c.arr_mins,
                        trip_id: c.trip_id,
                        trip_pos: c.trip_pos,
                    })
                    .collect(),
                next,
            },
        })
    }
}

/// A timetable held entirely in memory, covering exactly one date.
#[derive(Debug, Clone)]
pub struct InMemoryTimetable {
    date: NaiveDate,
    stations: MemoryStations,
    platforms: MemoryPlatforms,
    routes: MemoryRoutes,
    trips: MemoryTrips,
    transfers: MemoryTransfers,
    connections: MemoryConnections,
}

impl InMemoryTimetable {
    /// Returns the service day this timetable covers.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the stop id of a platform added to the builder.
    pub fn platform_stop_id(&self, platform: usize) -> usize {
        self.stations.records.len() + platform
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStations {
    records: Vec<(String, f64, f64)>,
}

impl Stations for MemoryStations {
    fn size(&self) -> usize {
        self.records.len()
    }

    fn name(&self, id: usize) -> &str {
        &self.records[id].0
    }

    fn longitude(&self, id: usize) -> f64 {
        self.records[id].1
    }

    fn latitude(&self, id: usize) -> f64 {
        self.records[id].2
    }
}

#[derive(Debug, Clone)]
pub struct MemoryPlatforms {
    records: Vec<(String, usize)>,
}

impl Platforms for MemoryPlatforms {
    fn size(&self) -> usize {
        self.records.len()
    }

    fn name(&self, id: usize) -> &str {
        &self.records[id].0
    }

    fn station_id(&self, id: usize) -> usize {
        self.records[id].1
    }
}

#[derive(Debug, Clone)]
pub struct MemoryRoutes {
    records: Vec<(String, Vehicle)>,
}

impl Routes for MemoryRoutes {
    fn size(&self) -> usize {
        self.records.len()
    }

    fn vehicle(&self, id: usize) -> Vehicle {
        self.records[id].1
    }

    fn name(&self, id: usize) -> &str {
        &self.records[id].0
    }
}

#[derive(Debug, Clone)]
pub struct MemoryTrips {
    records: Vec<(usize, String)>,
}

impl Trips for MemoryTrips {
    fn size(&self) -> usize {
        self.records.len()
    }

    fn route_id(&self, id: usize) -> usize {
        self.records[id].0
    }

    fn destination(&self, id: usize) -> &str {
        &self.records[id].1
    }
}

#[derive(Debug, Clone)]
pub struct MemoryTransfers {
    /// (departure station, arrival station, minutes), sorted by arrival
    /// station so each station's incoming transfers are contiguous.
    records: Vec<(usize, usize, i32)>,
    arriving: Vec<PackedRange>,
}

impl Transfers for MemoryTransfers {
    fn size(&self) -> usize {
        self.records.len()
    }

    fn dep_station_id(&self, id: usize) -> usize {
        self.records[id].0
    }

    fn minutes(&self, id: usize) -> i32 {
        self.records[id].2
    }

    fn arriving_at(&self, station_id: usize) -> PackedRange {
        self.arriving[station_id]
    }

    fn minutes_between(&self, dep_station_id: usize, arr_station_id: usize) -> Option<i32> {
        self.arriving[arr_station_id]
            .indices()
            .find(|&id| self.records[id].0 == dep_station_id)
            .map(|id| self.records[id].2)
    }
}

#[derive(Debug, Clone)]
struct ConnectionRecord {
    dep_stop: usize,
    dep_mins: i32,
    arr_stop: usize,
    arr_mins: i32,
    trip_id: usize,
    trip_pos: u32,
}

#[derive(Debug, Clone)]
pub struct MemoryConnections {
    records: Vec<ConnectionRecord>,
    next: Vec<usize>,
}

impl Connections for MemoryConnections {
    fn size(&self) -> usize {
        self.records.len()
    }

    fn dep_stop_id(&self, id: usize) -> usize {
        self.records[id].dep_stop
    }

    fn dep_mins(&self, id: usize) -> i32 {
        self.records[id].dep_mins
    }

    fn arr_stop_id(&self, id: usize) -> usize {
        self.records[id].arr_stop
    }

    fn arr_mins(&self, id: usize) -> i32 {
        self.records[id].arr_mins
    }

    fn trip_id(&self, id: usize) -> usize {
        self.records[id].trip_id
    }

    fn trip_pos(&self, id: usize) -> u32 {
        self.records[id].trip_pos
    }

    fn next_connection_id(&self, id: usize) -> usize {
        self.next[id]
    }
}

impl Timetable for InMemoryTimetable {
    type Stations = MemoryStations;
    type Platforms = MemoryPlatforms;
    type Transfers = MemoryTransfers;
    type Trips = MemoryTrips;
    type Routes = MemoryRoutes;
    type Connections = MemoryConnections;

    fn stations(&self) -> &MemoryStations {
        &self.stations
    }

    fn platforms(&self) -> &MemoryPlatforms {
        &self.platforms
    }

    fn transfers(&self) -> &MemoryTransfers {
        &self.transfers
    }

    fn routes(&self) -> &MemoryRoutes {
        &self.routes
    }

    /// # Panics
    ///
    /// Panics if `date` is not the day this timetable was built for.
    fn trips_for(&self, date: NaiveDate) -> &MemoryTrips {
        assert_eq!(date, self.date, "timetable covers only {}", self.date);
        &self.trips
    }

    /// # Panics
    ///
    /// Panics if `date` is not the day this timetable was built for.
    fn connections_for(&self, date: NaiveDate) -> &MemoryConnections {
        assert_eq!(date, self.date, "timetable covers only {}", self.date);
        &self.connections
    }
}
