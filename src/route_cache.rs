use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use uuid::Uuid;

use crate::routes::{Route, RouteStop};
use crate::routes_repo::RoutesRepository;

/// Cached route geometry with a 60-second TTL. Stop lists change rarely but
/// are read on every position report, so a short window keeps edits visible
/// without a Postgres round trip per update.
#[derive(Clone)]
pub struct RouteCache {
    repo: RoutesRepository,
    route_cache: Cache<Uuid, (Route, Vec<RouteStop>)>,
}

impl RouteCache {
    pub fn new(repo: RoutesRepository) -> Self {
        let route_cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(60))
            .build();
        Self { repo, route_cache }
    }

    pub async fn get_route_with_stops(
        &self,
        route_id: Uuid,
    ) -> Result<Option<(Route, Vec<RouteStop>)>> {
        if let Some(cached) = self.route_cache.get(&route_id).await {
            metrics::counter!("routes.cache.hit").increment(1);
            return Ok(Some(cached));
        }

        metrics::counter!("routes.cache.miss").increment(1);
        let Some(found) = self.repo.get_route_with_stops(route_id).await? else {
            return Ok(None);
        };
        self.route_cache.insert(route_id, found.clone()).await;
        Ok(Some(found))
    }

    /// Drop every cached route so the next read hits Postgres.
    pub async fn invalidate_all(&self) {
        self.route_cache.invalidate_all();
    }
}
