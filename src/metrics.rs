use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::info;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize Prometheus metrics exporter
/// Returns a handle that can be used to render metrics for scraping
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        // Engine evaluation is sub-millisecond; give it fine buckets
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full("ingest.evaluate_ms".to_string()),
            &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )
        .expect("failed to set buckets for ingest.evaluate_ms")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Background task to update process metrics
/// Updates uptime and memory usage metrics every 5 seconds
pub async fn process_metrics_task() {
    let start_time = Instant::now();

    loop {
        let uptime_seconds = start_time.elapsed().as_secs() as f64;
        metrics::gauge!("process.uptime.seconds").set(uptime_seconds);
        metrics::gauge!("process.is_up").set(1.0);

        // Get memory usage using procfs (Linux-specific)
        #[cfg(target_os = "linux")]
        {
            if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
                for line in status.lines() {
                    if line.starts_with("VmRSS:") {
                        // Parse RSS memory in kB
                        if let Some(kb_str) = line.split_whitespace().nth(1)
                            && let Ok(kb) = kb_str.parse::<f64>()
                        {
                            let bytes = kb * 1024.0;
                            metrics::gauge!("process.memory.bytes").set(bytes);
                        }
                        break;
                    }
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}

/// Initialize serve metrics to zero/default values
/// This ensures metrics always appear in Prometheus queries even if no events have occurred
pub fn initialize_serve_metrics() {
    // Ingest pipeline metrics
    metrics::counter!("ingest.accepted").absolute(0);
    metrics::counter!("ingest.skipped.no_fix").absolute(0);
    metrics::counter!("ingest.rejected.unknown_device").absolute(0);
    metrics::counter!("ingest.rejected.bad_key").absolute(0);

    // History sampler metrics
    metrics::counter!("history.samples.written").absolute(0);

    // Live snapshot cache metrics
    metrics::counter!("live.cache.hit").absolute(0);
    metrics::counter!("live.cache.miss").absolute(0);

    // NATS publisher metrics
    metrics::counter!("live.publish.sent").absolute(0);
    metrics::counter!("live.publish.failed").absolute(0);

    // Route geometry cache metrics
    metrics::counter!("routes.cache.hit").absolute(0);
    metrics::counter!("routes.cache.miss").absolute(0);
}

/// Start a standalone metrics server on the specified port
/// This is used by the "serve" subcommand to expose metrics independently
pub async fn start_metrics_server(port: u16) {
    let handle = init_metrics();
    METRICS_HANDLE
        .set(handle)
        .expect("Metrics handle already initialized");

    // Start process metrics background task
    tokio::spawn(process_metrics_task());

    let app = Router::new().route(
        "/metrics",
        get(|| async {
            let handle = METRICS_HANDLE
                .get()
                .expect("Metrics handle not initialized");
            handle.render()
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting metrics server on http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind metrics server");

    axum::serve(listener, app)
        .await
        .expect("Metrics server failed");
}
