use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::error;

use crate::actions::json_error;
use crate::web::AppState;

/// GET /api/stops. Every stop across all routes, for drawing route
/// geometry on the map.
pub async fn get_stops(State(state): State<AppState>) -> impl IntoResponse {
    match state.routes_repo.list_stops().await {
        Ok(stops) => Json(serde_json::json!({"stops": stops})).into_response(),
        Err(e) => {
            error!("Failed to list stops: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list stops").into_response()
        }
    }
}
