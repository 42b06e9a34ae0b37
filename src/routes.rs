use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed service route. Stops are traversed first-to-last when heading
/// FORWARD and last-to-first when heading REVERSE; the endpoints are the
/// route's terminals.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::routes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stop on a route. `stop_order` values are unique per route and define
/// the traversal sequence; they are not required to be contiguous.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::route_stops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RouteStop {
    pub id: Uuid,
    pub route_id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "order")]
    pub stop_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Flat stop listing served to map clients, one row per stop with the
/// owning route's name joined in.
#[derive(Debug, Clone, Queryable, Serialize)]
pub struct StopListing {
    pub name: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "order")]
    pub stop_order: i32,
    pub route: String,
}
