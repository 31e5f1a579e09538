//! Journey output model.
//!
//! A `Journey` is what the extractor hands to consuming layers: an
//! alternating sequence of walking and transport legs with validated
//! timing. All types here enforce their invariants at construction, so code
//! that receives them can trust their validity.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// The kind of vehicle operating a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Vehicle {
    Tram,
    Metro,
    Train,
    Bus,
    Ferry,
    AerialLift,
    Funicular,
}

impl Vehicle {
    /// All vehicle kinds, in declaration order.
    pub const ALL: [Vehicle; 7] = [
        Vehicle::Tram,
        Vehicle::Metro,
        Vehicle::Train,
        Vehicle::Bus,
        Vehicle::Ferry,
        Vehicle::AerialLift,
        Vehicle::Funicular,
    ];
}

/// Journey validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JourneyError {
    /// Journey has no legs
    #[error("journey must have at least one leg")]
    Empty,

    /// Two consecutive legs of the same kind
    #[error("legs must alternate between walking and transport")]
    NotAlternating,

    /// A leg departs before the previous one arrives
    #[error("leg departs at {departure} before the previous leg arrives at {arrival}")]
    DepartsBeforePreviousArrival {
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    },

    /// A leg does not start where the previous one ends
    #[error("leg departs from {found} but the previous leg arrives at {expected}")]
    DisconnectedStops { expected: String, found: String },

    /// A leg or stop dwell arrives before it departs
    #[error("arrival {arrival} precedes departure {departure}")]
    NegativeDuration {
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    },

    /// Stop coordinates outside the WGS84 domain
    #[error("stop coordinates ({longitude}, {latitude}) are out of range")]
    InvalidCoordinates { longitude: f64, latitude: f64 },
}

/// A named, geolocated stop, optionally on a specific platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    name: String,
    platform_name: Option<String>,
    longitude: f64,
    latitude: f64,
}

impl Stop {
    /// Creates a stop, validating its coordinates.
    ///
    /// # Errors
    ///
    /// Fails if `|longitude| > 180` or `|latitude| > 90`.
    pub fn new(
        name: impl Into<String>,
        platform_name: Option<String>,
        longitude: f64,
        latitude: f64,
    ) -> Result<Self, JourneyError> {
        if !(longitude.abs() <= 180.0 && latitude.abs() <= 90.0) {
            return Err(JourneyError::InvalidCoordinates {
                longitude,
                latitude,
            });
        }
        Ok(Stop {
            name: name.into(),
            platform_name,
            longitude,
            latitude,
        })
    }

    /// Returns the station name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the platform name, if the stop is a platform.
    pub fn platform_name(&self) -> Option<&str> {
        self.platform_name.as_deref()
    }

    /// Returns the longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

/// A stop a transport leg passes through without the traveller alighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermediateStop {
    stop: Stop,
    arr_time: NaiveDateTime,
    dep_time: NaiveDateTime,
}

impl IntermediateStop {
    /// Creates an intermediate stop.
    ///
    /// # Errors
    ///
    /// Fails if the vehicle would leave the stop before reaching it.
    pub fn new(
        stop: Stop,
        arr_time: NaiveDateTime,
        dep_time: NaiveDateTime,
    ) -> Result<Self, JourneyError> {
        if dep_time < arr_time {
            return Err(JourneyError::NegativeDuration {
                departure: dep_time,
                arrival: arr_time,
            });
        }
        Ok(IntermediateStop {
            stop,
            arr_time,
            dep_time,
        })
    }

    pub fn stop(&self) -> &Stop {
        &self.stop
    }

    pub fn arr_time(&self) -> NaiveDateTime {
        self.arr_time
    }

    pub fn dep_time(&self) -> NaiveDateTime {
        self.dep_time
    }
}

/// A walking leg between two stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Foot {
    dep_stop: Stop,
    dep_time: NaiveDateTime,
    arr_stop: Stop,
    arr_time: NaiveDateTime,
}

impl Foot {
    /// Creates a walking leg.
    ///
    /// # Errors
    ///
    /// Fails if the arrival precedes the departure.
    pub fn new(
        dep_stop: Stop,
        dep_time: NaiveDateTime,
        arr_stop: Stop,
        arr_time: NaiveDateTime,
    ) -> Result<Self, JourneyError> {
        if arr_time < dep_time {
            return Err(JourneyError::NegativeDuration {
                departure: dep_time,
                arrival: arr_time,
            });
        }
        Ok(Foot {
            dep_stop,
            dep_time,
            arr_stop,
            arr_time,
        })
    }

    /// Returns true if this walk changes platforms within one station.
    pub fn is_transfer(&self) -> bool {
        self.dep_stop.name() == self.arr_stop.name()
    }
}

/// A ride on one vehicle, boarding to alighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transport {
    dep_stop: Stop,
    dep_time: NaiveDateTime,
    arr_stop: Stop,
    arr_time: NaiveDateTime,
    intermediate_stops: Vec<IntermediateStop>,
    vehicle: Vehicle,
    route: String,
    destination: String,
}

impl Transport {
    /// Creates a transport leg.
    ///
    /// # Errors
    ///
    /// Fails if the arrival precedes the departure.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dep_stop: Stop,
        dep_time: NaiveDateTime,
        arr_stop: Stop,
        arr_time: NaiveDateTime,
        intermediate_stops: Vec<IntermediateStop>,
        vehicle: Vehicle,
        route: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Self, JourneyError> {
        if arr_time < dep_time {
            return Err(JourneyError::NegativeDuration {
                departure: dep_time,
                arrival: arr_time,
            });
        }
        Ok(Transport {
            dep_stop,
            dep_time,
            arr_stop,
            arr_time,
            intermediate_stops,
            vehicle,
            route: route.into(),
            destination: destination.into(),
        })
    }

    pub fn vehicle(&self) -> Vehicle {
        self.vehicle
    }

    /// Returns the route name (e.g. a line number).
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the headsign destination of the vehicle.
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// One leg of a journey: a walk or a ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Leg {
    Foot(Foot),
    Transport(Transport),
}

impl Leg {
    /// Returns the departure stop.
    pub fn dep_stop(&self) -> &Stop {
        match self {
            Leg::Foot(foot) => &foot.dep_stop,
            Leg::Transport(transport) => &transport.dep_stop,
        }
    }

    /// Returns the departure time.
    pub fn dep_time(&self) -> NaiveDateTime {
        match self {
            Leg::Foot(foot) => foot.dep_time,
            Leg::Transport(transport) => transport.dep_time,
        }
    }

    /// Returns the arrival stop.
    pub fn arr_stop(&self) -> &Stop {
        match self {
            Leg::Foot(foot) => &foot.arr_stop,
            Leg::Transport(transport) => &transport.arr_stop,
        }
    }

    /// Returns the arrival time.
    pub fn arr_time(&self) -> NaiveDateTime {
        match self {
            Leg::Foot(foot) => foot.arr_time,
            Leg::Transport(transport) => transport.arr_time,
        }
    }

    /// Returns the stops passed through without alighting.
    pub fn intermediate_stops(&self) -> &[IntermediateStop] {
        match self {
            Leg::Foot(_) => &[],
            Leg::Transport(transport) => &transport.intermediate_stops,
        }
    }

    /// Returns the duration of the leg.
    pub fn duration(&self) -> Duration {
        self.arr_time() - self.dep_time()
    }

    /// Returns true if this is a walking leg.
    pub fn is_foot(&self) -> bool {
        matches!(self, Leg::Foot(_))
    }
}

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Legs strictly alternate between walking and transport
/// - Each leg departs no earlier than the previous leg arrives
/// - Each leg departs from the stop the previous leg arrives at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Journey {
    legs: Vec<Leg>,
}

impl Journey {
    /// Constructs a journey, validating its structure.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any invariant listed on [`Journey`] is violated.
    pub fn new(legs: Vec<Leg>) -> Result<Self, JourneyError> {
        if legs.is_empty() {
            return Err(JourneyError::Empty);
        }

        for window in legs.windows(2) {
            let (previous, current) = (&window[0], &window[1]);

            if previous.is_foot() == current.is_foot() {
                return Err(JourneyError::NotAlternating);
            }
            if current.dep_time() < previous.arr_time() {
                return Err(JourneyError::DepartsBeforePreviousArrival {
                    departure: current.dep_time(),
                    arrival: previous.arr_time(),
                });
            }
            if current.dep_stop() != previous.arr_stop() {
                return Err(JourneyError::DisconnectedStops {
                    expected: previous.arr_stop().name().to_string(),
                    found: current.dep_stop().name().to_string(),
                });
            }
        }

        Ok(Journey { legs })
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the first stop of the journey.
    pub fn dep_stop(&self) -> &Stop {
        // Non-empty: validated at construction
        self.legs[0].dep_stop()
    }

    /// Returns the last stop of the journey.
    pub fn arr_stop(&self) -> &Stop {
        self.legs[self.legs.len() - 1].arr_stop()
    }

    /// Returns the departure time of the journey.
    pub fn dep_time(&self) -> NaiveDateTime {
        self.legs[0].dep_time()
    }

    /// Returns the arrival time of the journey.
    pub fn arr_time(&self) -> NaiveDateTime {
        self.legs[self.legs.len() - 1].arr_time()
    }

    /// Returns the total duration of the journey.
    pub fn duration(&self) -> Duration {
        self.arr_time() - self.dep_time()
    }

    /// Returns the number of changes between vehicles.
    pub fn changes(&self) -> usize {
        self.legs
            .iter()
            .filter(|leg| !leg.is_foot())
            .count()
            .saturating_sub(1)
    }
}
