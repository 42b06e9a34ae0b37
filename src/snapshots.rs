//! The canonical live view of a vehicle.
//!
//! One [`BusSnapshot`] shape is shared by the TTL cache, the NATS fan-out
//! and the dashboard query response, so every consumer sees identical
//! fields no matter which path served them. Snapshots are derived and
//! disposable; the `buses` row is the authority.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::buses::{Bus, Direction, TripStatus};
use crate::routes::RouteStop;
use crate::trip_engine::{self, AcceptedFix, Evaluation, Traffic, classify_traffic};

/// How long a snapshot stays in the live cache without a fresh update.
pub const SNAPSHOT_TTL: std::time::Duration = std::time::Duration::from_secs(300);

/// Shown to riders while a vehicle is waiting at a terminal.
pub const READY_HINT: &str = "Departs in a few minutes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusSnapshot {
    /// Device id, the stable public identifier for map clients.
    pub id: String,
    pub name: String,
    /// Route name, or `"No Route"` for unassigned vehicles.
    pub route: String,
    pub lat: f64,
    pub lng: f64,
    pub speed: f64,
    pub direction: Direction,
    pub trip_status: TripStatus,
    pub traffic: Traffic,
    pub current_stop: Option<String>,
    pub at_stop: bool,
    /// Last confirmed stop order; absent while at a start sentinel.
    pub progress_order: Option<i32>,
    pub origin: String,
    pub destination: String,
    /// Epoch seconds of the last accepted report.
    pub last_seen: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

fn ready_hint(trip_status: TripStatus) -> Option<String> {
    (trip_status == TripStatus::Ready).then(|| READY_HINT.to_string())
}

impl BusSnapshot {
    /// Build from a just-committed engine evaluation.
    pub fn from_evaluation(
        bus: &Bus,
        route_name: Option<&str>,
        fix: AcceptedFix,
        eval: &Evaluation,
        seen_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: bus.device_id.clone(),
            name: bus.name.clone(),
            route: route_name.unwrap_or("No Route").to_string(),
            lat: fix.latitude,
            lng: fix.longitude,
            speed: fix.speed_kmh,
            direction: eval.state.direction,
            trip_status: eval.state.trip_status,
            traffic: eval.traffic,
            current_stop: eval.current_stop.clone(),
            at_stop: eval.at_stop,
            progress_order: eval.state.progress.order(),
            origin: eval.origin.clone(),
            destination: eval.destination.clone(),
            last_seen: seen_at.timestamp(),
            hint: ready_hint(eval.state.trip_status),
        }
    }

    /// Rebuild from the persisted row when the cache no longer has the
    /// vehicle. Read-only: the stop check reports arrival but never
    /// advances stored progress. `None` when the vehicle has never
    /// reported a position.
    pub fn from_stored(bus: &Bus, route_name: Option<&str>, stops: &[RouteStop]) -> Option<Self> {
        let lat = bus.latitude?;
        let lng = bus.longitude?;
        let last_contact = bus.last_contact?;
        let speed = bus.speed_kmh.unwrap_or(0.0);

        let current_stop = if bus.direction != Direction::Stopped {
            trip_engine::first_stop_in_radius(stops, lat, lng).map(|stop| stop.name.clone())
        } else {
            None
        };
        let at_stop = current_stop.is_some();
        let (origin, destination) = trip_engine::trip_endpoints(stops, bus.direction);

        Some(Self {
            id: bus.device_id.clone(),
            name: bus.name.clone(),
            route: route_name.unwrap_or("No Route").to_string(),
            lat,
            lng,
            speed,
            direction: bus.direction,
            trip_status: bus.trip_status,
            traffic: classify_traffic(speed),
            current_stop,
            at_stop,
            progress_order: bus.progress().order(),
            origin,
            destination,
            last_seen: last_contact.timestamp(),
            hint: ready_hint(bus.trip_status),
        })
    }
}

/// How long after its last contact a vehicle may still be served from the
/// database. Vehicles underway get a longer window since dead zones and
/// tunnels are expected mid-trip; an idle one that goes quiet should drop
/// off the map quickly.
pub fn staleness_window(trip_status: TripStatus) -> Duration {
    match trip_status {
        TripStatus::OnTrip => Duration::minutes(10),
        _ => Duration::minutes(2),
    }
}

pub fn is_recent(
    last_contact: DateTime<Utc>,
    trip_status: TripStatus,
    now: DateTime<Utc>,
) -> bool {
    last_contact >= now - staleness_window(trip_status)
}

/// Short-TTL store holding the latest snapshot per device id.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    async fn insert(&self, snapshot: BusSnapshot);
    async fn get(&self, device_id: &str) -> Option<BusSnapshot>;
}

/// Fan-out of accepted updates to live viewers. Implementations must
/// return immediately and deliver best effort; a lost publish is repaired
/// by the next update.
pub trait SnapshotPublisher: Send + Sync {
    fn publish(&self, snapshot: &BusSnapshot);
}
