use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use profile_router::extract;
use profile_router::journey::{Journey, Leg, Vehicle};
use profile_router::router::Router;
use profile_router::timetable::{Stations, StopSpec, Timetable, TimetableBuilder};

fn print_journeys(label: &str, journeys: &[Journey]) {
    println!();
    println!("{} journey(s) from {label}:", journeys.len());
    for journey in journeys {
        println!(
            "  {} -> {} ({} min, {} change(s))",
            journey.dep_time().format("%H:%M"),
            journey.arr_time().format("%H:%M"),
            journey.duration().num_minutes(),
            journey.changes()
        );
        for leg in journey.legs() {
            match leg {
                Leg::Foot(_) => println!(
                    "    {} walk       {} -> {}",
                    leg.dep_time().format("%H:%M"),
                    leg.dep_stop().name(),
                    leg.arr_stop().name()
                ),
                Leg::Transport(transport) => println!(
                    "    {} {:<10} {} -> {} (arr {})",
                    leg.dep_time().format("%H:%M"),
                    transport.route(),
                    leg.dep_stop().name(),
                    leg.arr_stop().name(),
                    leg.arr_time().format("%H:%M")
                ),
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let date = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");

    let mut builder = TimetableBuilder::new(date);
    let lausanne = builder.station("Lausanne", 6.629, 46.517);
    let renens = builder.station("Renens VD", 6.578, 46.537);
    let morges = builder.station("Morges", 6.497, 46.511);
    let geneva = builder.station("Genève", 6.142, 46.210);
    builder.transfer(renens, lausanne, 18);

    let ir = builder.route("IR 90", Vehicle::Train);
    let s5 = builder.route("S5", Vehicle::Train);
    builder.trip(
        ir,
        "Genève-Aéroport",
        &[
            (StopSpec::Station(lausanne), 600, 600),
            (StopSpec::Station(morges), 610, 611),
            (StopSpec::Station(geneva), 645, 645),
        ],
    );
    builder.trip(
        ir,
        "Genève-Aéroport",
        &[
            (StopSpec::Station(lausanne), 630, 630),
            (StopSpec::Station(morges), 640, 641),
            (StopSpec::Station(geneva), 675, 675),
        ],
    );
    builder.trip(
        s5,
        "Morges",
        &[
            (StopSpec::Station(renens), 598, 598),
            (StopSpec::Station(morges), 608, 608),
        ],
    );

    let timetable = builder.build().expect("demo timetable is valid");

    let router = Router::new(&timetable);
    let profile = router.profile(date, geneva).expect("profile scan succeeds");

    println!(
        "Profile for {} on {date}: {} stations",
        timetable.stations().name(geneva),
        profile.station_count()
    );

    for station in [lausanne, renens] {
        let journeys = extract::journeys(&timetable, &profile, station)
            .expect("profile and timetable are consistent");
        print_journeys(timetable.stations().name(station), &journeys);
    }
}
