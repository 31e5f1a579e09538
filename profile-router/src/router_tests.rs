//! End-to-end scenarios: scan a small in-memory network, then reconstruct
//! journeys from the resulting profile.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::extract::journeys;
use crate::journey::{Leg, Vehicle};
use crate::router::{Router, RoutingError};
use crate::timetable::{StopSpec, TimetableBuilder};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn at(mins: i32) -> NaiveDateTime {
    date().and_time(NaiveTime::MIN) + chrono::Duration::minutes(mins as i64)
}

/// One connection: X at 600 -> Y at 620.
fn single_connection() -> (TimetableBuilder, usize, usize) {
    let mut builder = TimetableBuilder::new(date());
    let x = builder.station("Xylo", 6.0, 46.0);
    let y = builder.station("Ypres", 6.1, 46.1);
    let route = builder.route("M1", Vehicle::Metro);
    builder.trip(
        route,
        "Ypres",
        &[
            (StopSpec::Station(x), 600, 600),
            (StopSpec::Station(y), 620, 620),
        ],
    );
    (builder, x, y)
}

#[test]
fn single_connection_profile() {
    let (builder, x, y) = single_connection();
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let front = profile.for_station(x);
    assert_eq!(front.size(), 1);
    let entry = front.get(620, 0).unwrap();
    assert_eq!(entry.dep_mins(), 600);
    assert_eq!(entry.arr_mins(), 620);
    assert_eq!(entry.changes(), 0);
}

#[test]
fn faster_second_trip_coexists_with_first() {
    // A second connection on another trip: departing earlier and arriving
    // earlier is incomparable with the first one, so both survive.
    let (mut builder, x, y) = single_connection();
    let route = builder.route("M2", Vehicle::Metro);
    builder.trip(
        route,
        "Ypres",
        &[
            (StopSpec::Station(x), 580, 580),
            (StopSpec::Station(y), 610, 610),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let front = profile.for_station(x);
    assert_eq!(front.size(), 2);
    assert_eq!(front.get(610, 0).unwrap().dep_mins(), 580);
    assert_eq!(front.get(620, 0).unwrap().dep_mins(), 600);
}

#[test]
fn dominated_connection_is_pruned() {
    // Departing earlier AND arriving later than the first connection:
    // dominated, never enters the front.
    let (mut builder, x, y) = single_connection();
    let route = builder.route("B9", Vehicle::Bus);
    builder.trip(
        route,
        "Ypres",
        &[
            (StopSpec::Station(x), 590, 590),
            (StopSpec::Station(y), 625, 625),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let front = profile.for_station(x);
    assert_eq!(front.size(), 1);
    assert_eq!(front.get(620, 0).unwrap().dep_mins(), 600);
}

#[test]
fn footpath_propagates_to_neighbor() {
    let (mut builder, x, y) = single_connection();
    let z = builder.station("Zenith", 6.2, 46.2);
    builder.transfer(z, x, 5);
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let front = profile.for_station(z);
    assert_eq!(front.size(), 1);
    let entry = front.get(620, 0).unwrap();
    // Leave Zenith 5 minutes before the connection departs
    assert_eq!(entry.dep_mins(), 595);
    assert_eq!(entry.changes(), 0);
}

#[test]
fn destination_unreachable_from_unrelated_station() {
    let (mut builder, _, y) = single_connection();
    let lonely = builder.station("Walden", 6.3, 46.3);
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();
    assert!(profile.for_station(lonely).is_empty());
}

#[test]
fn unknown_destination_rejected() {
    let (builder, _, _) = single_connection();
    let timetable = builder.build().unwrap();
    let result = Router::new(&timetable).profile(date(), 99);
    assert_eq!(
        result.unwrap_err(),
        RoutingError::UnknownArrivalStation {
            id: 99,
            station_count: 2
        }
    );
}

#[test]
fn extracts_single_leg_journey() {
    let (builder, x, y) = single_connection();
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let found = journeys(&timetable, &profile, x).unwrap();
    assert_eq!(found.len(), 1);
    let journey = &found[0];
    assert_eq!(journey.legs().len(), 1);
    assert!(matches!(journey.legs()[0], Leg::Transport(_)));
    assert_eq!(journey.dep_time(), at(600));
    assert_eq!(journey.arr_time(), at(620));
    assert_eq!(journey.duration(), chrono::Duration::minutes(20));
    assert_eq!(journey.dep_stop().name(), "Xylo");
    assert_eq!(journey.arr_stop().name(), "Ypres");
    assert_eq!(journey.changes(), 0);
}

#[test]
fn extracts_journey_with_change() {
    let mut builder = TimetableBuilder::new(date());
    let a = builder.station("Asters", 6.0, 46.0);
    let b = builder.station("Briona", 6.1, 46.1);
    let c = builder.station("Corseaux", 6.2, 46.2);
    let r1 = builder.route("S1", Vehicle::Train);
    let r2 = builder.route("S2", Vehicle::Train);
    builder.trip(
        r1,
        "Briona",
        &[
            (StopSpec::Station(a), 600, 600),
            (StopSpec::Station(b), 620, 620),
        ],
    );
    builder.trip(
        r2,
        "Corseaux",
        &[
            (StopSpec::Station(b), 630, 630),
            (StopSpec::Station(c), 650, 650),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), c).unwrap();

    let front = profile.for_station(a);
    assert_eq!(front.size(), 1);
    assert_eq!(front.get(650, 1).unwrap().dep_mins(), 600);

    let found = journeys(&timetable, &profile, a).unwrap();
    assert_eq!(found.len(), 1);
    let journey = &found[0];
    assert_eq!(journey.changes(), 1);

    // Transport, transfer walk at Briona, transport
    assert_eq!(journey.legs().len(), 3);
    assert!(matches!(journey.legs()[0], Leg::Transport(_)));
    match &journey.legs()[1] {
        Leg::Foot(foot) => assert!(foot.is_transfer()),
        Leg::Transport(_) => panic!("expected a transfer walk between the trains"),
    }
    assert!(matches!(journey.legs()[2], Leg::Transport(_)));
    assert_eq!(journey.dep_time(), at(600));
    assert_eq!(journey.arr_time(), at(650));
}

#[test]
fn riding_through_collects_intermediate_stops() {
    let mut builder = TimetableBuilder::new(date());
    let a = builder.station("Asters", 6.0, 46.0);
    let b = builder.station("Briona", 6.1, 46.1);
    let c = builder.station("Corseaux", 6.2, 46.2);
    let route = builder.route("IC 5", Vehicle::Train);
    builder.trip(
        route,
        "Corseaux",
        &[
            (StopSpec::Station(a), 600, 600),
            (StopSpec::Station(b), 620, 622),
            (StopSpec::Station(c), 640, 640),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), c).unwrap();

    let front = profile.for_station(a);
    assert_eq!(front.size(), 1);
    assert_eq!(front.get(640, 0).unwrap().dep_mins(), 600);

    let found = journeys(&timetable, &profile, a).unwrap();
    assert_eq!(found.len(), 1);
    let journey = &found[0];
    assert_eq!(journey.legs().len(), 1);
    assert_eq!(journey.changes(), 0);

    let stops = journey.legs()[0].intermediate_stops();
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0].stop().name(), "Briona");
    assert_eq!(stops[0].arr_time(), at(620));
    assert_eq!(stops[0].dep_time(), at(622));
}

#[test]
fn leading_walk_from_footpath_neighbor() {
    let (mut builder, x, y) = single_connection();
    let z = builder.station("Zenith", 6.2, 46.2);
    builder.transfer(z, x, 5);
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let found = journeys(&timetable, &profile, z).unwrap();
    assert_eq!(found.len(), 1);
    let journey = &found[0];
    assert_eq!(journey.legs().len(), 2);
    match &journey.legs()[0] {
        Leg::Foot(foot) => assert!(!foot.is_transfer()),
        Leg::Transport(_) => panic!("expected a leading walk"),
    }
    assert_eq!(journey.dep_time(), at(595));
    assert_eq!(journey.dep_stop().name(), "Zenith");
    assert_eq!(journey.arr_time(), at(620));
}

#[test]
fn closing_walk_to_destination() {
    let mut builder = TimetableBuilder::new(date());
    let x = builder.station("Xylo", 6.0, 46.0);
    let y = builder.station("Ypres", 6.1, 46.1);
    let d = builder.station("Delos", 6.2, 46.2);
    builder.transfer(y, d, 7);
    let route = builder.route("M1", Vehicle::Metro);
    builder.trip(
        route,
        "Ypres",
        &[
            (StopSpec::Station(x), 600, 600),
            (StopSpec::Station(y), 620, 620),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), d).unwrap();

    let front = profile.for_station(x);
    assert_eq!(front.size(), 1);
    assert_eq!(front.get(627, 0).unwrap().dep_mins(), 600);

    let found = journeys(&timetable, &profile, x).unwrap();
    assert_eq!(found.len(), 1);
    let journey = &found[0];
    assert_eq!(journey.legs().len(), 2);
    assert!(matches!(journey.legs()[1], Leg::Foot(_)));
    assert_eq!(journey.arr_time(), at(627));
    assert_eq!(journey.arr_stop().name(), "Delos");
}

#[test]
fn journeys_sorted_by_departure_then_arrival() {
    let (mut builder, x, y) = single_connection();
    let route = builder.route("M2", Vehicle::Metro);
    builder.trip(
        route,
        "Ypres",
        &[
            (StopSpec::Station(x), 580, 580),
            (StopSpec::Station(y), 610, 610),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let found = journeys(&timetable, &profile, x).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].dep_time(), at(580));
    assert_eq!(found[0].arr_time(), at(610));
    assert_eq!(found[1].dep_time(), at(600));
    assert_eq!(found[1].arr_time(), at(620));
}

#[test]
fn overnight_minutes_land_on_the_previous_day() {
    let mut builder = TimetableBuilder::new(date());
    let x = builder.station("Xylo", 6.0, 46.0);
    let y = builder.station("Ypres", 6.1, 46.1);
    let route = builder.route("N1", Vehicle::Bus);
    // Departs 23:30 the evening before the service day
    builder.trip(
        route,
        "Ypres",
        &[
            (StopSpec::Station(x), -30, -30),
            (StopSpec::Station(y), 10, 10),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    let found = journeys(&timetable, &profile, x).unwrap();
    assert_eq!(found.len(), 1);
    let previous_day = date().pred_opt().unwrap();
    assert_eq!(
        found[0].dep_time(),
        previous_day.and_hms_opt(23, 30, 0).unwrap()
    );
    assert_eq!(found[0].arr_time(), date().and_hms_opt(0, 10, 0).unwrap());
}

#[test]
fn platform_details_survive_extraction() {
    let mut builder = TimetableBuilder::new(date());
    let x = builder.station("Xylo", 6.0, 46.0);
    let y = builder.station("Ypres", 6.1, 46.1);
    let x2 = builder.platform("2", x);
    let y1 = builder.platform("1", y);
    let route = builder.route("IR 15", Vehicle::Train);
    builder.trip(
        route,
        "Ypres",
        &[
            (StopSpec::Platform(x2), 600, 600),
            (StopSpec::Platform(y1), 620, 620),
        ],
    );
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();

    // Fronts are stored per station even when trips serve platforms
    assert_eq!(profile.for_station(x).size(), 1);

    let found = journeys(&timetable, &profile, x).unwrap();
    assert_eq!(found.len(), 1);
    let journey = &found[0];
    assert_eq!(journey.dep_stop().name(), "Xylo");
    assert_eq!(journey.dep_stop().platform_name(), Some("2"));
    assert_eq!(journey.arr_stop().platform_name(), Some("1"));
}

#[test]
fn profile_for_station_without_options_extracts_nothing() {
    let (mut builder, _, y) = single_connection();
    let lonely = builder.station("Walden", 6.3, 46.3);
    let timetable = builder.build().unwrap();
    let profile = Router::new(&timetable).profile(date(), y).unwrap();
    assert!(journeys(&timetable, &profile, lonely).unwrap().is_empty());
}
