pub mod live;
pub mod stops;
pub mod telemetry;

pub use live::*;
pub use stops::*;
pub use telemetry::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};

/// JSON error envelope shared by every handler.
pub fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (
        status,
        Json(serde_json::json!({"status": "error", "message": message})),
    )
}
