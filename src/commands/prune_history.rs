use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use bustrack::bus_locations_repo::BusLocationsRepository;
use bustrack::web::PgPool;

/// Delete location history older than the retention window. Idempotent and
/// safe to run while ingestion is live; it only touches rows behind the
/// cutoff.
pub async fn handle_prune_history(days: i64, diesel_pool: PgPool) -> Result<()> {
    let cutoff = Utc::now() - Duration::days(days);
    info!(
        "Pruning location history older than {} days (before {})",
        days, cutoff
    );

    let repo = BusLocationsRepository::new(diesel_pool);
    let deleted = repo.delete_recorded_before(cutoff).await?;

    info!("Pruned {} location history rows", deleted);
    Ok(())
}
