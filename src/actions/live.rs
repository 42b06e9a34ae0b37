use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use tracing::error;

use crate::actions::json_error;
use crate::snapshots::{self, BusSnapshot};
use crate::web::AppState;

/// GET /api/update-location. The live fleet view: the cached snapshot per
/// active vehicle when one exists, otherwise a snapshot rebuilt from the
/// persisted row if the device reported recently enough to trust.
pub async fn get_live_buses(State(state): State<AppState>) -> impl IntoResponse {
    let buses = match state.buses_repo.get_active().await {
        Ok(buses) => buses,
        Err(e) => {
            error!("Failed to load active buses: {}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .into_response();
        }
    };

    let now = Utc::now();
    let mut live = Vec::with_capacity(buses.len());
    for bus in &buses {
        if let Some(snapshot) = state.snapshot_cache.get(&bus.device_id).await {
            live.push(snapshot);
            continue;
        }

        // A moving vehicle is allowed a longer contact gap than an idle
        // one before it drops off the map.
        let recent = bus
            .last_contact
            .map(|t| snapshots::is_recent(t, bus.trip_status, now))
            .unwrap_or(false);
        if !recent {
            continue;
        }

        let route = match bus.route_id {
            Some(route_id) => match state.route_cache.get_route_with_stops(route_id).await {
                Ok(route) => route,
                Err(e) => {
                    error!("Failed to load route for {}: {}", bus.device_id, e);
                    None
                }
            },
            None => None,
        };
        let (route_name, stops) = match &route {
            Some((route, stops)) => (Some(route.name.as_str()), stops.as_slice()),
            None => (None, &[][..]),
        };

        if let Some(snapshot) = BusSnapshot::from_stored(bus, route_name, stops) {
            live.push(snapshot);
        }
    }

    Json(serde_json::json!({"status": "success", "buses": live})).into_response()
}
