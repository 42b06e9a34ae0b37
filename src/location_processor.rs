use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::buses::Direction;
use crate::buses_repo::BusesRepository;
use crate::route_cache::RouteCache;
use crate::sim7600::parse_sim7600;
use crate::snapshots::{BusSnapshot, SnapshotCache, SnapshotPublisher};
use crate::trip_engine::{self, AcceptedFix, TripState};

/// Per-device mutexes so reports for one vehicle are processed in order
/// while different vehicles proceed in parallel.
type DeviceLocksMap = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// One telemetry report as posted by a device.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryReport {
    /// Device id the unit was provisioned with.
    pub bus_id: String,
    pub api_key: String,
    /// Raw line from the GPS module, passed through unparsed.
    #[serde(default)]
    pub gps_raw: String,
    /// Explicit speed in km/h. When present it wins over the decoded value.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Operator-selected direction. Absent or STOPPED means "infer".
    #[serde(default)]
    pub direction: Direction,
}

/// What became of one report.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// State committed; carries the snapshot that was dispatched.
    Accepted(BusSnapshot),
    /// Device is healthy but has no satellite fix yet. Not an error.
    NoFix,
    /// No vehicle is registered under the reported id.
    UnknownDevice,
    /// Vehicle exists but the pre-shared key does not match.
    InvalidKey,
}

/// Imperative shell around [`trip_engine::evaluate`]: authenticates the
/// device, decodes the raw fix, serializes the read-modify-write per
/// device, commits the result and fans the snapshot out.
#[derive(Clone)]
pub struct LocationProcessor {
    buses_repo: BusesRepository,
    route_cache: RouteCache,
    snapshot_cache: Arc<dyn SnapshotCache>,
    publisher: Option<Arc<dyn SnapshotPublisher>>,
    device_locks: DeviceLocksMap,
}

impl LocationProcessor {
    pub fn new(
        buses_repo: BusesRepository,
        route_cache: RouteCache,
        snapshot_cache: Arc<dyn SnapshotCache>,
        publisher: Option<Arc<dyn SnapshotPublisher>>,
    ) -> Self {
        Self {
            buses_repo,
            route_cache,
            snapshot_cache,
            publisher,
            device_locks: Arc::new(DashMap::new()),
        }
    }

    pub async fn process_report(&self, report: TelemetryReport) -> Result<UpdateOutcome> {
        let Some(bus) = self.buses_repo.get_by_device_id(&report.bus_id).await? else {
            debug!("Rejected report from unregistered device {}", report.bus_id);
            metrics::counter!("ingest.rejected.unknown_device").increment(1);
            return Ok(UpdateOutcome::UnknownDevice);
        };
        if bus.api_key != report.api_key {
            warn!("Rejected report for {} with a bad API key", report.bus_id);
            metrics::counter!("ingest.rejected.bad_key").increment(1);
            return Ok(UpdateOutcome::InvalidKey);
        }

        let Some(decoded) = parse_sim7600(&report.gps_raw) else {
            debug!("Device {} has no usable fix yet", report.bus_id);
            metrics::counter!("ingest.skipped.no_fix").increment(1);
            return Ok(UpdateOutcome::NoFix);
        };
        let fix = AcceptedFix {
            latitude: decoded.latitude,
            longitude: decoded.longitude,
            speed_kmh: report.speed.or(decoded.speed_kmh).unwrap_or(0.0),
        };

        // Get or create the per-device lock, then hold it across the
        // re-read, evaluation and commit so concurrent reports for this
        // device serialize.
        let device_lock = self
            .device_locks
            .entry(report.bus_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = device_lock.lock().await;

        // Re-read under the lock; the row fetched for auth may predate a
        // commit by a report that held the lock before us.
        let Some(bus) = self.buses_repo.get_by_device_id(&report.bus_id).await? else {
            return Ok(UpdateOutcome::UnknownDevice);
        };

        let route = match bus.route_id {
            Some(route_id) => self.route_cache.get_route_with_stops(route_id).await?,
            None => None,
        };
        let (route_name, stops) = match &route {
            Some((route, stops)) => (Some(route.name.as_str()), stops.as_slice()),
            None => (None, &[][..]),
        };

        let started = Instant::now();
        let evaluation =
            trip_engine::evaluate(&TripState::of_bus(&bus), fix, report.direction, stops);
        metrics::histogram!("ingest.evaluate_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        let seen_at = Utc::now();
        let sampled = self
            .buses_repo
            .commit_update(bus.id, fix, &evaluation.state, seen_at)
            .await?;
        if sampled {
            metrics::counter!("history.samples.written").increment(1);
        }

        let snapshot = BusSnapshot::from_evaluation(&bus, route_name, fix, &evaluation, seen_at);

        // Best effort from here on: the state is committed, and a lost
        // cache write or publish is repaired by the next report.
        self.snapshot_cache.insert(snapshot.clone()).await;
        if let Some(publisher) = &self.publisher {
            publisher.publish(&snapshot);
        }

        debug!(
            "Device {} now {:?}/{:?} at ({}, {})",
            report.bus_id,
            evaluation.state.direction,
            evaluation.state.trip_status,
            fix.latitude,
            fix.longitude
        );
        metrics::counter!("ingest.accepted").increment(1);
        Ok(UpdateOutcome::Accepted(snapshot))
    }
}
