use anyhow::Result;
use std::sync::Arc;
use tracing::Instrument;
use tracing::{info, warn};

use bustrack::buses_repo::BusesRepository;
use bustrack::live_cache::LiveSnapshotCache;
use bustrack::location_processor::LocationProcessor;
use bustrack::nats_publisher::NatsSnapshotPublisher;
use bustrack::route_cache::RouteCache;
use bustrack::routes_repo::RoutesRepository;
use bustrack::snapshots::{SnapshotCache, SnapshotPublisher};
use bustrack::web::{AppState, PgPool, start_web_server};

#[tracing::instrument(skip_all)]
pub async fn handle_serve(
    interface: String,
    port: u16,
    nats_url: Option<String>,
    metrics_port: Option<u16>,
    diesel_pool: PgPool,
) -> Result<()> {
    // Initialize all serve metrics to zero so they appear in scrapes even
    // before events occur. This MUST happen before starting the metrics
    // server to avoid race conditions where a scrape lands first.
    bustrack::metrics::initialize_serve_metrics();

    if let Some(metrics_port) = metrics_port {
        info!("Starting metrics server on port {}", metrics_port);
        tokio::spawn(
            async move {
                bustrack::metrics::start_metrics_server(metrics_port).await;
            }
            .instrument(tracing::info_span!("metrics_server")),
        );
    }

    // Try to create the snapshot publisher, fall back to serving without
    // fan-out if NATS is unreachable. Live viewers degrade to polling; the
    // authoritative state path does not depend on NATS at all.
    let publisher: Option<Arc<dyn SnapshotPublisher>> = match &nats_url {
        Some(nats_url) => match NatsSnapshotPublisher::new(nats_url).await {
            Ok(publisher) => {
                info!("Created snapshot publisher with NATS at {}", nats_url);
                Some(Arc::new(publisher))
            }
            Err(e) => {
                warn!(
                    "Failed to connect to NATS ({}), serving without live fan-out",
                    e
                );
                None
            }
        },
        None => {
            info!("No NATS URL configured, serving without live fan-out");
            None
        }
    };

    let buses_repo = BusesRepository::new(diesel_pool.clone());
    let routes_repo = RoutesRepository::new(diesel_pool.clone());
    let route_cache = RouteCache::new(routes_repo.clone());
    let snapshot_cache: Arc<dyn SnapshotCache> = Arc::new(LiveSnapshotCache::new());

    let processor = Arc::new(LocationProcessor::new(
        buses_repo.clone(),
        route_cache.clone(),
        Arc::clone(&snapshot_cache),
        publisher,
    ));

    let app_state = AppState {
        processor,
        buses_repo,
        routes_repo,
        route_cache,
        snapshot_cache,
    };

    start_web_server(interface, port, app_state).await
}
