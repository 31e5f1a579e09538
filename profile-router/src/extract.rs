//! Journey reconstruction.
//!
//! A completed [`Profile`] only stores packed criteria; the payload of each
//! front entry names the connection to board and how many stops the
//! traveller rides through before leaving the trip. Following that trail
//! rebuilds the concrete journey without re-running any part of the scan.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::journey::{Foot, IntermediateStop, Journey, JourneyError, Leg, Stop, Transport};
use crate::pack::{unpack_24, unpack_8};
use crate::profile::Profile;
use crate::timetable::{Connections, Routes, Stations, Timetable, Transfers, Trips};

/// Error aborting a journey reconstruction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractError {
    /// The profile has no entry where the payload trail expects one
    #[error(
        "no front entry at station {station_id} for arrival {arr_mins} with {changes} changes"
    )]
    MissingContinuation {
        station_id: usize,
        arr_mins: i32,
        changes: u32,
    },

    /// The trail requires a footpath the transfer table does not have
    #[error("no footpath between stations {dep_station_id} and {arr_station_id}")]
    MissingFootpath {
        dep_station_id: usize,
        arr_station_id: usize,
    },

    /// A reconstructed leg sequence failed journey validation
    #[error(transparent)]
    Journey(#[from] JourneyError),
}

fn minutes_to_datetime(date: NaiveDate, minutes: i32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(minutes as i64)
}

fn stop_at<T: Timetable>(timetable: &T, stop_id: usize) -> Result<Stop, ExtractError> {
    let station_id = timetable.station_id(stop_id);
    let stations = timetable.stations();
    Ok(Stop::new(
        stations.name(station_id),
        timetable.platform_name(stop_id).map(str::to_string),
        stations.longitude(station_id),
        stations.latitude(station_id),
    )?)
}

fn foot_leg<T: Timetable>(
    timetable: &T,
    date: NaiveDate,
    start_mins: i32,
    dep_stop_id: usize,
    arr_stop_id: usize,
) -> Result<Leg, ExtractError> {
    let dep_station_id = timetable.station_id(dep_stop_id);
    let arr_station_id = timetable.station_id(arr_stop_id);
    let walk_mins = timetable
        .transfers()
        .minutes_between(dep_station_id, arr_station_id)
        .ok_or(ExtractError::MissingFootpath {
            dep_station_id,
            arr_station_id,
        })?;
    Ok(Leg::Foot(Foot::new(
        stop_at(timetable, dep_stop_id)?,
        minutes_to_datetime(date, start_mins),
        stop_at(timetable, arr_stop_id)?,
        minutes_to_datetime(date, start_mins + walk_mins),
    )?))
}

/// Reconstructs every Pareto-optimal journey from `dep_station_id` to the
/// profile's destination, sorted by (departure time, arrival time).
///
/// # Errors
///
/// Fails if the payload trail points at front entries or footpaths that do
/// not exist; on a profile produced by
/// [`Router::profile`](crate::router::Router::profile) over the same
/// timetable this indicates inconsistent input data.
///
/// # Panics
///
/// Panics if `dep_station_id` is out of range for the profile.
pub fn journeys<T: Timetable>(
    timetable: &T,
    profile: &Profile,
    dep_station_id: usize,
) -> Result<Vec<Journey>, ExtractError> {
    let date = profile.date();
    let connections = timetable.connections_for(date);
    let trips = timetable.trips_for(date);
    let routes = timetable.routes();

    let front = profile.for_station(dep_station_id);
    let mut journeys = Vec::with_capacity(front.size());

    for criteria in front.iter() {
        let journey_dep_mins = criteria.dep_mins();
        let journey_arr_mins = criteria.arr_mins();
        let mut remaining_changes = criteria.changes();

        let mut payload = criteria.payload();
        let mut connection_id = unpack_24(payload) as usize;
        let mut intermediate_stops = unpack_8(payload);
        let mut dep_stop_id = connections.dep_stop_id(connection_id);
        let mut dep_mins = connections.dep_mins(connection_id);

        let mut legs: Vec<Leg> = Vec::new();

        if dep_station_id != timetable.station_id(dep_stop_id) {
            legs.push(foot_leg(
                timetable,
                date,
                journey_dep_mins,
                dep_station_id,
                dep_stop_id,
            )?);
        }

        let mut arr_stop_id;
        let mut arr_mins;
        let mut arr_station_id;
        loop {
            let mut ridden_through = Vec::with_capacity(intermediate_stops as usize);
            for _ in 0..intermediate_stops {
                let stop_arr_time = minutes_to_datetime(date, connections.arr_mins(connection_id));
                connection_id = connections.next_connection_id(connection_id);
                let stop_id = connections.dep_stop_id(connection_id);
                let stop_dep_time = minutes_to_datetime(date, connections.dep_mins(connection_id));
                ridden_through.push(IntermediateStop::new(
                    stop_at(timetable, stop_id)?,
                    stop_arr_time,
                    stop_dep_time,
                )?);
            }

            let leg_dep_stop = stop_at(timetable, dep_stop_id)?;
            let leg_dep_time = minutes_to_datetime(date, dep_mins);
            arr_stop_id = connections.arr_stop_id(connection_id);
            arr_mins = connections.arr_mins(connection_id);
            arr_station_id = timetable.station_id(arr_stop_id);
            let trip_id = connections.trip_id(connection_id);
            let route_id = trips.route_id(trip_id);

            legs.push(Leg::Transport(Transport::new(
                leg_dep_stop,
                leg_dep_time,
                stop_at(timetable, arr_stop_id)?,
                minutes_to_datetime(date, arr_mins),
                ridden_through,
                routes.vehicle(route_id),
                routes.name(route_id),
                trips.destination(trip_id),
            )?));

            if remaining_changes == 0 {
                break;
            }
            remaining_changes -= 1;

            // The continuation at the station we just alighted at shares the
            // journey's final arrival and the remaining change count.
            let entry = profile
                .for_station(arr_station_id)
                .get(journey_arr_mins, remaining_changes)
                .ok_or(ExtractError::MissingContinuation {
                    station_id: arr_station_id,
                    arr_mins: journey_arr_mins,
                    changes: remaining_changes,
                })?;
            payload = entry.payload();
            connection_id = unpack_24(payload) as usize;
            intermediate_stops = unpack_8(payload);
            let boarding_stop_id = connections.dep_stop_id(connection_id);
            legs.push(foot_leg(
                timetable,
                date,
                arr_mins,
                arr_stop_id,
                boarding_stop_id,
            )?);
            dep_stop_id = boarding_stop_id;
            dep_mins = connections.dep_mins(connection_id);
        }

        if arr_station_id != profile.arr_station_id() {
            legs.push(foot_leg(
                timetable,
                date,
                arr_mins,
                arr_stop_id,
                profile.arr_station_id(),
            )?);
        }

        journeys.push(Journey::new(legs)?);
    }

    journeys.sort_by_key(|journey| (journey.dep_time(), journey.arr_time()));
    debug!(
        dep_station_id,
        count = journeys.len(),
        "journeys reconstructed"
    );
    Ok(journeys)
}
