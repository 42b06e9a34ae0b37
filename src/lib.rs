//! BusTrack - fleet GPS ingestion and live trip tracking
//!
//! This library turns raw GPS reports from vehicle-mounted SIM7600 modules
//! into per-vehicle trip state (direction, status, stop progress) and fans
//! the resulting snapshots out to live viewers.

pub mod geo;
pub mod sim7600;
pub mod trip_engine;

pub mod buses;
pub mod buses_repo;
pub mod bus_locations;
pub mod bus_locations_repo;
pub mod routes;
pub mod routes_repo;
pub mod route_cache;
pub mod schema;

pub mod live_cache;
pub mod location_processor;
pub mod nats_publisher;
pub mod snapshots;

pub mod actions;
pub mod metrics;
pub mod web;

pub use location_processor::{LocationProcessor, TelemetryReport, UpdateOutcome};
pub use nats_publisher::NatsSnapshotPublisher;
pub use snapshots::BusSnapshot;
