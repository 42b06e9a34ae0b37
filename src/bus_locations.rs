use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::buses::Direction;
use crate::geo::haversine_distance;

/// Minimum displacement before another history row is worth keeping.
/// Caps stored track density at roughly one point per 15 m of path no
/// matter how often a device reports.
pub const HISTORY_MIN_DISTANCE_METERS: f64 = 15.0;

/// An immutable historical position sample. Written only by the location
/// processor, read for track playback, pruned by age after seven days.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::bus_locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BusLocation {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub direction: Direction,
    pub recorded_at: DateTime<Utc>,
}

/// Insert form; `id` and `recorded_at` are assigned by the database.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::bus_locations)]
pub struct NewBusLocation {
    pub bus_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub direction: Direction,
}

/// Whether a fix at (`latitude`, `longitude`) is far enough from the most
/// recent persisted sample to be worth another history row.
pub fn is_novel_position(prior: Option<&BusLocation>, latitude: f64, longitude: f64) -> bool {
    match prior {
        None => true,
        Some(last) => {
            haversine_distance(last.latitude, last.longitude, latitude, longitude)
                > HISTORY_MIN_DISTANCE_METERS
        }
    }
}
