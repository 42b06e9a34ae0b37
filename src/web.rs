use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use tower_http::cors::CorsLayer;
use tracing::info;

use crate::actions;
use crate::buses_repo::BusesRepository;
use crate::location_processor::LocationProcessor;
use crate::route_cache::RouteCache;
use crate::routes_repo::RoutesRepository;
use crate::snapshots::SnapshotCache;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

// App state shared by all handlers. The cache handles are clones of the
// ones inside the processor, so the ingest and query paths see the same
// entries.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<LocationProcessor>,
    pub buses_repo: BusesRepository,
    pub routes_repo: RoutesRepository,
    pub route_cache: RouteCache,
    pub snapshot_cache: Arc<dyn SnapshotCache>,
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Middleware for request logging with correlation ID
async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = Uuid::new_v4().to_string()[..8].to_string();
    let start_time = Instant::now();

    info!("Started {} {} [{}]", method, path, request_id);

    let response = next.run(request).await;
    let duration = start_time.elapsed();
    let status = response.status();

    info!(
        "Completed {} {} [{}] {} in {:.2}ms",
        method,
        path,
        request_id,
        status.as_u16(),
        duration.as_secs_f64() * 1000.0
    );

    response
}

/// Resolves when the process receives SIGTERM or SIGINT, letting in-flight
/// updates commit before the listener closes.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT (Ctrl+C), shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), shutting down...");
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGINT signal: {}", err);
            }
        }
    }
}

pub async fn start_web_server(interface: String, port: u16, app_state: AppState) -> Result<()> {
    info!("Starting web server on {}:{}", interface, port);

    // Create CORS layer that allows all origins and methods
    let cors_layer = CorsLayer::permissive();

    // Create API sub-router rooted at "/api". Devices POST to the same
    // path the dashboard polls.
    let api_router = Router::new()
        .route(
            "/update-location",
            get(actions::get_live_buses).post(actions::post_location_update),
        )
        .route("/stops", get(actions::get_stops))
        .with_state(app_state.clone());

    // Build the main Axum application
    let app = Router::new()
        .nest("/api", api_router)
        .route("/healthz", get(healthz))
        .with_state(app_state)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(cors_layer);

    // Create the listener
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", interface, port)).await?;
    info!("Web server listening on http://{}:{}", interface, port);

    // Start the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
