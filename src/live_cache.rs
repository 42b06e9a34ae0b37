use async_trait::async_trait;
use moka::future::Cache;

use crate::snapshots::{BusSnapshot, SNAPSHOT_TTL, SnapshotCache};

/// In-process snapshot cache with a hard TTL. A vehicle that stops
/// reporting ages out on its own; nothing ever deletes entries explicitly.
#[derive(Clone)]
pub struct LiveSnapshotCache {
    cache: Cache<String, BusSnapshot>,
}

impl LiveSnapshotCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(4096)
                .time_to_live(SNAPSHOT_TTL)
                .build(),
        }
    }
}

impl Default for LiveSnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotCache for LiveSnapshotCache {
    async fn insert(&self, snapshot: BusSnapshot) {
        self.cache.insert(snapshot.id.clone(), snapshot).await;
    }

    async fn get(&self, device_id: &str) -> Option<BusSnapshot> {
        let hit = self.cache.get(device_id).await;
        if hit.is_some() {
            metrics::counter!("live.cache.hit").increment(1);
        } else {
            metrics::counter!("live.cache.miss").increment(1);
        }
        hit
    }
}
