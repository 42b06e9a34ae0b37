//! Per-vehicle trip state machine.
//!
//! Evaluates one accepted fix at a time against the vehicle's stored state
//! and its route's ordered stop list, and produces the next state plus the
//! projection fields viewers see (origin/destination, traffic, stop
//! arrival). Pure computation: persistence, locking and fan-out live in
//! [`crate::location_processor`].

use serde::{Deserialize, Serialize};

use crate::buses::{Bus, Direction, StopProgress, TripStatus};
use crate::geo::haversine_distance;
use crate::routes::RouteStop;

/// Within this range of a terminal the vehicle is "at" it.
pub const TERMINAL_RADIUS_METERS: f64 = 100.0;
/// Outer edge of the departure/approach band around a terminal.
pub const TRANSITION_BAND_METERS: f64 = 1000.0;
/// A vehicle inside this range of a stop has arrived at it.
pub const STOP_ARRIVAL_RADIUS_METERS: f64 = 50.0;
/// Above this speed the vehicle is considered moving.
pub const MOVE_THRESHOLD_KMH: f64 = 5.0;
/// Below this speed the vehicle is considered stationary.
pub const STOP_THRESHOLD_KMH: f64 = 3.0;

/// Congestion label derived from instantaneous speed alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traffic {
    Heavy,
    Medium,
    Normal,
}

pub fn classify_traffic(speed_kmh: f64) -> Traffic {
    if speed_kmh < 5.0 {
        Traffic::Heavy
    } else if speed_kmh < 25.0 {
        Traffic::Medium
    } else {
        Traffic::Normal
    }
}

/// The trip fields of a vehicle's persisted state, as one value the engine
/// can take in and hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripState {
    pub direction: Direction,
    pub trip_status: TripStatus,
    pub progress: StopProgress,
}

impl TripState {
    pub fn of_bus(bus: &Bus) -> Self {
        Self {
            direction: bus.direction,
            trip_status: bus.trip_status,
            progress: bus.progress(),
        }
    }
}

/// A decoded fix with its speed already resolved (explicit envelope speed
/// first, then decoder speed, then 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptedFix {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
}

/// Everything one engine pass produces: the state to persist plus the
/// derived projection for the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub state: TripState,
    pub traffic: Traffic,
    pub current_stop: Option<String>,
    pub at_stop: bool,
    pub origin: String,
    pub destination: String,
    pub manual_override: bool,
}

/// Terminal names for a direction of travel: FORWARD runs first-to-last,
/// anything else is presented as the return pairing. `"Unknown"` when the
/// route has no stops.
pub fn trip_endpoints(stops: &[RouteStop], direction: Direction) -> (String, String) {
    match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => match direction {
            Direction::Forward => (first.name.clone(), last.name.clone()),
            _ => (last.name.clone(), first.name.clone()),
        },
        _ => ("Unknown".to_string(), "Unknown".to_string()),
    }
}

/// Scan stops in route order and report the first one within arrival
/// radius of the fix. Iteration order is the tie-break, not distance.
pub fn first_stop_in_radius<'a>(
    stops: &'a [RouteStop],
    latitude: f64,
    longitude: f64,
) -> Option<&'a RouteStop> {
    stops.iter().find(|stop| {
        haversine_distance(latitude, longitude, stop.latitude, stop.longitude)
            <= STOP_ARRIVAL_RADIUS_METERS
    })
}

/// Advance the state machine by one accepted fix.
///
/// `signal` is the device-reported direction (defaults to STOPPED when the
/// operator pressed nothing). `stops` must already be ordered by
/// `stop_order`; an empty slice disables all geospatial inference and the
/// fix still updates position, speed and traffic.
pub fn evaluate(
    prev: &TripState,
    fix: AcceptedFix,
    signal: Direction,
    stops: &[RouteStop],
) -> Evaluation {
    let mut state = *prev;

    // An operator-supplied direction wins outright for this update and
    // suppresses every automatic direction change below.
    let manual_override = signal != Direction::Stopped && signal != state.direction;
    if manual_override {
        state.direction = signal;
        state.progress = StopProgress::start_of(signal);
        state.trip_status = TripStatus::Ready;
    }

    let mut current_stop = None;
    let mut at_stop = false;

    if let (Some(first), Some(last)) = (stops.first(), stops.last()) {
        let dist_first =
            haversine_distance(fix.latitude, fix.longitude, first.latitude, first.longitude);
        let dist_last =
            haversine_distance(fix.latitude, fix.longitude, last.latitude, last.longitude);
        // The nearer terminal implies the direction a vehicle around it is
        // serving: departing the first terminal means FORWARD, departing
        // the last means REVERSE. Ties go to the first terminal.
        let (terminal_dist, terminal_direction) = if dist_first <= dist_last {
            (dist_first, Direction::Forward)
        } else {
            (dist_last, Direction::Reverse)
        };

        if terminal_dist <= TERMINAL_RADIUS_METERS {
            if fix.speed_kmh > MOVE_THRESHOLD_KMH {
                state.trip_status = TripStatus::OnTrip;
            } else if fix.speed_kmh < STOP_THRESHOLD_KMH && state.trip_status != TripStatus::Idle {
                // IDLE is an explicit rest state; terminal proximity alone
                // does not wake it up.
                state.trip_status = TripStatus::Ready;
            }
            if !manual_override && state.direction != terminal_direction {
                state.direction = terminal_direction;
                state.progress = StopProgress::start_of(terminal_direction);
            }
        } else if terminal_dist < TRANSITION_BAND_METERS {
            if fix.speed_kmh > MOVE_THRESHOLD_KMH && !manual_override {
                if state.direction != terminal_direction {
                    state.direction = terminal_direction;
                    state.progress = StopProgress::start_of(terminal_direction);
                }
                state.trip_status = TripStatus::OnTrip;
            }
        } else if fix.speed_kmh > MOVE_THRESHOLD_KMH {
            state.trip_status = TripStatus::OnTrip;
        }

        // Stop arrival. No direction yet means no notion of progress, so
        // the scan is skipped entirely.
        if state.direction != Direction::Stopped
            && let Some(stop) = first_stop_in_radius(stops, fix.latitude, fix.longitude)
        {
            current_stop = Some(stop.name.clone());
            at_stop = true;
            if state.progress.advances(state.direction, stop.stop_order) {
                state.progress = StopProgress::At(stop.stop_order);
            }
        }
    }

    let traffic = classify_traffic(fix.speed_kmh);
    let (origin, destination) = trip_endpoints(stops, state.direction);

    Evaluation {
        state,
        traffic,
        current_stop,
        at_stop,
        origin,
        destination,
        manual_override,
    }
}
