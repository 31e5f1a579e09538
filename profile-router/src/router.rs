//! Connection-scan router.
//!
//! One backward pass over the connections of a day, latest departure first,
//! computes for every station the Pareto front of journeys to a fixed
//! destination. By the time a connection is processed, every front already
//! reflects all connections departing no earlier, so each connection only
//! has to combine three sources of continuations: walking straight to the
//! destination, staying seated on its trip, and the plans already known at
//! its arrival station.

use chrono::NaiveDate;
use tracing::debug;

use crate::criteria::{CriteriaError, PackedCriteria};
use crate::front::ParetoFrontBuilder;
use crate::pack::{self, PackError};
use crate::profile::{Profile, ProfileBuilder};
use crate::timetable::{
    Connections, Stations, Timetable, Transfers, Trips, connections_in_scan_order,
};

/// Error aborting a profile computation.
///
/// The scan has no partial-failure mode: a single out-of-range value aborts
/// the whole computation and the caller decides whether to retry with
/// corrected input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// Destination station id outside the network
    #[error("arrival station id {id} is out of range for {station_count} stations")]
    UnknownArrivalStation { id: usize, station_count: usize },

    /// The connections violate their scan-order contract
    #[error("connections are not in non-increasing departure order")]
    UnsortedConnections,

    /// A time or change count left its packed range
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    /// A payload field overflowed
    #[error(transparent)]
    Pack(#[from] PackError),
}

/// The connection-scan driver.
///
/// The scan is sequential and synchronous; callers wanting responsiveness
/// run it on a background task and cache the resulting [`Profile`] per
/// (date, destination).
#[derive(Debug, Clone, Copy)]
pub struct Router<'a, T> {
    timetable: &'a T,
}

impl<'a, T: Timetable> Router<'a, T> {
    /// Creates a router over the given timetable.
    pub fn new(timetable: &'a T) -> Self {
        Router { timetable }
    }

    /// Computes the profile for reaching `arr_station_id` on `date`.
    ///
    /// # Errors
    ///
    /// Fails if the destination id is out of range, if the connections are
    /// not in scan order, or if any packed value leaves its range during
    /// the scan.
    pub fn profile(&self, date: NaiveDate, arr_station_id: usize) -> Result<Profile, RoutingError> {
        let timetable = self.timetable;
        let stations = timetable.stations();
        let transfers = timetable.transfers();
        let connections = timetable.connections_for(date);
        let trips = timetable.trips_for(date);

        if arr_station_id >= stations.size() {
            return Err(RoutingError::UnknownArrivalStation {
                id: arr_station_id,
                station_count: stations.size(),
            });
        }
        if !connections_in_scan_order(connections) {
            return Err(RoutingError::UnsortedConnections);
        }

        debug!(
            connections = connections.size(),
            stations = stations.size(),
            arr_station_id,
            "starting profile scan"
        );

        // Walking minutes from each station straight to the destination.
        let mut walk_to_destination: Vec<Option<i32>> = vec![None; stations.size()];
        for transfer_id in transfers.arriving_at(arr_station_id).indices() {
            walk_to_destination[transfers.dep_station_id(transfer_id)] =
                Some(transfers.minutes(transfer_id));
        }

        let mut profile = ProfileBuilder::new(date, arr_station_id, stations.size(), trips.size());
        let mut front = ParetoFrontBuilder::new();

        for connection_id in 0..connections.size() {
            let dep_station = timetable.station_id(connections.dep_stop_id(connection_id));
            let arr_station = timetable.station_id(connections.arr_stop_id(connection_id));
            let dep_mins = connections.dep_mins(connection_id);
            let arr_mins = connections.arr_mins(connection_id);
            let trip_id = connections.trip_id(connection_id);
            let trip_pos = connections.trip_pos(connection_id);
            let payload = connection_id as u32;

            // Alight and walk straight to the destination.
            if let Some(walk_mins) = walk_to_destination[arr_station] {
                front.add(PackedCriteria::pack(arr_mins + walk_mins, 0, payload)?);
            }

            // Stay seated: everything this trip already leads to.
            front.add_all(profile.for_trip(trip_id));

            // Alight and continue with a plan already known at the arrival
            // station, if it departs late enough to be caught.
            for criteria in profile.for_station(arr_station).iter() {
                if criteria.dep_mins() >= arr_mins {
                    front.add(PackedCriteria::pack(
                        criteria.arr_mins(),
                        criteria.changes() + 1,
                        payload,
                    )?);
                }
            }

            if front.is_empty() {
                continue;
            }

            // Earlier-departing connections of the same trip inherit these
            // continuations.
            profile.for_trip_mut(trip_id).add_all(&front);

            // Propagate to every station with a footpath to the departure
            // station (the self-transfer included), unless the departure
            // station's front already fully dominates the new options.
            if !profile
                .for_station(dep_station)
                .fully_dominates(&front, dep_mins)?
            {
                for transfer_id in transfers.arriving_at(dep_station).indices() {
                    let origin = transfers.dep_station_id(transfer_id);
                    let origin_dep_mins = dep_mins - transfers.minutes(transfer_id);

                    for criteria in front.iter() {
                        let leave_connection = criteria.payload() as usize;
                        let intermediate_stops =
                            connections.trip_pos(leave_connection) - trip_pos;
                        let trail = pack::pack_24_8(payload, intermediate_stops)?;
                        let tuple =
                            PackedCriteria::pack(criteria.arr_mins(), criteria.changes(), trail)?
                                .with_dep_mins(origin_dep_mins)?;
                        profile.for_station_mut(origin).add(tuple);
                    }
                }
            }

            front.clear();
        }

        let profile = profile.build();
        debug!(
            reachable = (0..profile.station_count())
                .filter(|&station| !profile.for_station(station).is_empty())
                .count(),
            "profile scan complete"
        );
        Ok(profile)
    }
}
