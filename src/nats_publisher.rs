use anyhow::Result;
use async_nats::Client;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::snapshots::{BusSnapshot, SnapshotPublisher};

/// All live viewers share one subject; there is no per-vehicle or
/// per-subscriber filtering.
fn live_subject() -> &'static str {
    match std::env::var("BUSTRACK_ENV") {
        Ok(env) if env == "production" => "buses.live",
        _ => "staging.buses.live",
    }
}

async fn publish_to_nats(nats_client: &Client, snapshot: &BusSnapshot) -> Result<()> {
    let payload = serde_json::to_vec(snapshot)?;
    nats_client.publish(live_subject(), payload.into()).await?;
    debug!("Published snapshot for {} to NATS", snapshot.id);
    Ok(())
}

/// NATS-backed fan-out of live snapshots.
#[derive(Clone)]
pub struct NatsSnapshotPublisher {
    nats_client: Arc<Client>,
}

impl NatsSnapshotPublisher {
    pub async fn new(nats_url: &str) -> Result<Self> {
        info!("Connecting to NATS server at {}", nats_url);
        let nats_client = async_nats::ConnectOptions::new()
            .name("bustrack-serve")
            .connect(nats_url)
            .await?;

        Ok(Self {
            nats_client: Arc::new(nats_client),
        })
    }
}

impl SnapshotPublisher for NatsSnapshotPublisher {
    fn publish(&self, snapshot: &BusSnapshot) {
        let nats_client = Arc::clone(&self.nats_client);
        let snapshot = snapshot.clone();

        // At most once: a failed publish is logged and forgotten, the next
        // accepted update replaces it anyway.
        tokio::spawn(async move {
            if let Err(e) = publish_to_nats(&nats_client, &snapshot).await {
                error!("Failed to publish snapshot for {}: {}", snapshot.id, e);
                metrics::counter!("live.publish.failed").increment(1);
            } else {
                metrics::counter!("live.publish.sent").increment(1);
            }
        });
    }
}
