//! Scenario tests that replay multi-fix sequences through the trip engine.
//!
//! Unit tests in `src/trip_engine.rs` pin down single transitions; these
//! tests thread each evaluation's state back into the next call the way
//! the location processor does, and follow a vehicle through whole legs of
//! a route: depot rollout, the outbound run, turnaround at the far
//! terminal and the return leg.

use bustrack::buses::{Direction, StopProgress, TripStatus};
use bustrack::routes::RouteStop;
use bustrack::trip_engine::{self, AcceptedFix, Evaluation, TripState};
use chrono::Utc;
use uuid::Uuid;

// North-south line: 0.009 degrees of latitude is ~1 km, which places
// consecutive stops just outside their neighbors' transition bands.
const ROUTE_LNG: f64 = 88.6581;

fn stop(order: i32, name: &str, latitude: f64) -> RouteStop {
    RouteStop {
        id: Uuid::new_v4(),
        route_id: Uuid::nil(),
        name: name.to_string(),
        latitude,
        longitude: ROUTE_LNG,
        stop_order: order,
        created_at: Utc::now(),
    }
}

fn campus_city_route() -> Vec<RouteStop> {
    vec![
        stop(1, "Campus Gate", 25.6953),
        stop(2, "Science Building", 25.7043),
        stop(3, "Market Square", 25.7133),
        stop(4, "River Bridge", 25.7223),
        stop(5, "City Terminal", 25.7313),
    ]
}

fn fresh_state() -> TripState {
    TripState {
        direction: Direction::Stopped,
        trip_status: TripStatus::Idle,
        progress: StopProgress::BeforeFirst,
    }
}

/// Replay `(latitude, speed_kmh)` fixes in order, feeding each
/// evaluation's state into the next call. The direction signal stays
/// STOPPED, matching a device whose operator never touches the switch.
fn drive(mut state: TripState, fixes: &[(f64, f64)], stops: &[RouteStop]) -> Vec<Evaluation> {
    let mut evaluations = Vec::with_capacity(fixes.len());
    for &(latitude, speed_kmh) in fixes {
        let fix = AcceptedFix {
            latitude,
            longitude: ROUTE_LNG,
            speed_kmh,
        };
        let eval = trip_engine::evaluate(&state, fix, Direction::Stopped, stops);
        state = eval.state;
        evaluations.push(eval);
    }
    evaluations
}

#[test]
fn test_depot_rollout_and_forward_leg() {
    let stops = campus_city_route();
    // Overnight at Campus Gate, then a normal outbound run sampled clear
    // of the far terminal's band.
    let evals = drive(
        fresh_state(),
        &[
            (25.6953, 0.0),  // at rest at the first terminal
            (25.6953, 9.0),  // pulling out
            (25.7043, 24.0), // Science Building
            (25.7088, 32.0), // open road between stops
            (25.7133, 10.0), // Market Square
            (25.7223, 16.0), // River Bridge
        ],
        &stops,
    );

    // Terminal proximity assigns FORWARD right away, but rest alone never
    // wakes an IDLE vehicle.
    assert_eq!(evals[0].state.direction, Direction::Forward);
    assert_eq!(evals[0].state.trip_status, TripStatus::Idle);
    assert_eq!(evals[0].state.progress, StopProgress::At(1));
    assert_eq!(evals[0].current_stop.as_deref(), Some("Campus Gate"));

    // Moving through the terminal starts the trip.
    assert_eq!(evals[1].state.trip_status, TripStatus::OnTrip);

    let orders: Vec<Option<i32>> = evals.iter().map(|e| e.state.progress.order()).collect();
    assert_eq!(
        orders,
        vec![Some(1), Some(1), Some(2), Some(2), Some(3), Some(4)],
        "confirmed progress should advance stop by stop"
    );

    assert_eq!(evals[2].current_stop.as_deref(), Some("Science Building"));
    assert_eq!(evals[3].current_stop, None);
    assert!(!evals[3].at_stop);

    for eval in &evals[1..] {
        assert_eq!(eval.state.direction, Direction::Forward);
        assert_eq!(eval.state.trip_status, TripStatus::OnTrip);
        assert_eq!(eval.origin, "Campus Gate");
        assert_eq!(eval.destination, "City Terminal");
    }
}

#[test]
fn test_turnaround_at_far_terminal() {
    let stops = campus_city_route();
    let inbound = TripState {
        direction: Direction::Forward,
        trip_status: TripStatus::OnTrip,
        progress: StopProgress::At(4),
    };
    let evals = drive(
        inbound,
        &[
            (25.7268, 18.0), // inside the far terminal's band
            (25.7313, 6.0),  // rolling into City Terminal
            (25.7313, 0.0),  // resting at the terminal
            (25.7268, 12.0), // departing back through the band
            (25.7223, 14.0), // River Bridge on the return leg
        ],
        &stops,
    );

    // A moving vehicle inside the band already serves the far terminal's
    // departure direction, so the flip happens on approach.
    assert_eq!(evals[0].state.direction, Direction::Reverse);
    assert_eq!(evals[0].state.progress, StopProgress::PastLast);
    assert_eq!(evals[0].origin, "City Terminal");
    assert_eq!(evals[0].destination, "Campus Gate");

    // Arrival confirms the terminal stop against the fresh REVERSE leg.
    assert_eq!(evals[1].state.progress, StopProgress::At(5));
    assert_eq!(evals[1].current_stop.as_deref(), Some("City Terminal"));

    // Resting at the terminal readies the next departure.
    assert_eq!(evals[2].state.trip_status, TripStatus::Ready);
    assert_eq!(evals[2].state.direction, Direction::Reverse);
    assert_eq!(evals[2].state.progress, StopProgress::At(5));

    // Departure, then the first confirmed stop of the return leg.
    assert_eq!(evals[3].state.trip_status, TripStatus::OnTrip);
    assert_eq!(evals[3].state.progress, StopProgress::At(5));
    assert_eq!(evals[4].state.progress, StopProgress::At(4));
}

#[test]
fn test_position_bounce_never_regresses_progress() {
    let stops = campus_city_route();
    let mid_route = TripState {
        direction: Direction::Forward,
        trip_status: TripStatus::OnTrip,
        progress: StopProgress::At(3),
    };
    // A stale fix puts the vehicle back at Science Building before good
    // fixes resume at Market Square and River Bridge.
    let evals = drive(
        mid_route,
        &[(25.7043, 20.0), (25.7133, 20.0), (25.7223, 20.0)],
        &stops,
    );

    // The bounced fix still reports the stop it landed on, but confirmed
    // progress holds.
    assert!(evals[0].at_stop);
    assert_eq!(evals[0].current_stop.as_deref(), Some("Science Building"));
    assert_eq!(evals[0].state.progress, StopProgress::At(3));

    assert_eq!(evals[1].state.progress, StopProgress::At(3));
    assert_eq!(evals[2].state.progress, StopProgress::At(4));
}

#[test]
fn test_operator_turnaround_mid_route() {
    let stops = campus_city_route();
    let outbound = TripState {
        direction: Direction::Forward,
        trip_status: TripStatus::OnTrip,
        progress: StopProgress::At(3),
    };

    // Breakdown between stops: the operator flips the switch to REVERSE.
    let fix = AcceptedFix {
        latitude: 25.7088,
        longitude: ROUTE_LNG,
        speed_kmh: 0.0,
    };
    let turned = trip_engine::evaluate(&outbound, fix, Direction::Reverse, &stops);
    assert!(turned.manual_override);
    assert_eq!(turned.state.direction, Direction::Reverse);
    assert_eq!(turned.state.trip_status, TripStatus::Ready);
    assert_eq!(turned.state.progress, StopProgress::PastLast);
    assert_eq!(turned.origin, "City Terminal");

    // The next confirmed stop belongs to the new leg.
    let evals = drive(turned.state, &[(25.7043, 18.0)], &stops);
    assert_eq!(evals[0].state.trip_status, TripStatus::OnTrip);
    assert_eq!(evals[0].state.progress, StopProgress::At(2));
    assert_eq!(evals[0].destination, "Campus Gate");
}

/// Drives a complete round trip and checks the invariant the per-step
/// tests imply: within one direction of travel, confirmed stop orders
/// move one way only.
#[test]
fn test_round_trip_progress_is_monotonic_per_leg() {
    let stops = campus_city_route();
    let evals = drive(
        fresh_state(),
        &[
            (25.6953, 0.0),
            (25.6953, 9.0),
            (25.7043, 24.0),
            (25.7088, 32.0),
            (25.7133, 10.0),
            (25.7223, 16.0),
            (25.7268, 18.0),
            (25.7313, 6.0),
            (25.7313, 0.0),
            (25.7268, 12.0),
            (25.7223, 14.0),
            (25.7133, 16.0),
            (25.7043, 20.0),
            (25.6998, 25.0),
            (25.6953, 2.0),
        ],
        &stops,
    );

    assert!(
        evals.iter().any(|e| e.state.direction == Direction::Reverse),
        "the sequence should include a return leg"
    );

    let mut prev: Option<(Direction, i32)> = None;
    for eval in &evals {
        if let Some(order) = eval.state.progress.order() {
            if let Some((direction, prev_order)) = prev
                && direction == eval.state.direction
            {
                match direction {
                    Direction::Forward => assert!(
                        order >= prev_order,
                        "forward progress regressed from {} to {}",
                        prev_order,
                        order
                    ),
                    Direction::Reverse => assert!(
                        order <= prev_order,
                        "reverse progress regressed from {} to {}",
                        prev_order,
                        order
                    ),
                    Direction::Stopped => {}
                }
            }
            prev = Some((eval.state.direction, order));
        }
    }

    // Back at Campus Gate, readied for the next outbound run.
    let last = evals.last().unwrap();
    assert_eq!(last.state.direction, Direction::Forward);
    assert_eq!(last.state.trip_status, TripStatus::Ready);
    assert_eq!(last.state.progress, StopProgress::At(1));
}
