use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::error;

use crate::actions::json_error;
use crate::location_processor::{TelemetryReport, UpdateOutcome};
use crate::web::AppState;

/// POST /api/update-location. Devices report position here. A report
/// without a satellite fix is acknowledged as skipped so the device does
/// not treat it as a failure and retry.
pub async fn post_location_update(
    State(state): State<AppState>,
    Json(report): Json<TelemetryReport>,
) -> impl IntoResponse {
    match state.processor.process_report(report).await {
        Ok(UpdateOutcome::Accepted(_)) => {
            Json(serde_json::json!({"status": "success"})).into_response()
        }
        Ok(UpdateOutcome::NoFix) => Json(serde_json::json!({
            "status": "skipped",
            "message": "GPS Fix Waiting"
        }))
        .into_response(),
        Ok(UpdateOutcome::UnknownDevice) => {
            json_error(StatusCode::NOT_FOUND, "Bus not registered").into_response()
        }
        Ok(UpdateOutcome::InvalidKey) => {
            json_error(StatusCode::FORBIDDEN, "Invalid API Key").into_response()
        }
        Err(e) => {
            error!("Failed to process location update: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process update")
                .into_response()
        }
    }
}
