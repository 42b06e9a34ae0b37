use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::buses_repo::{PgPool, PgPooledConnection};
use crate::schema::bus_locations;

#[derive(Clone)]
pub struct BusLocationsRepository {
    pool: PgPool,
}

impl BusLocationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn get_connection(&self) -> Result<PgPooledConnection> {
        self.pool
            .get()
            .map_err(|e| anyhow::anyhow!("Failed to get database connection: {}", e))
    }

    /// Delete history rows recorded strictly before the cutoff. Returns the
    /// number of rows removed.
    pub async fn delete_recorded_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.get_connection()?;
        let deleted =
            diesel::delete(bus_locations::table.filter(bus_locations::recorded_at.lt(cutoff)))
                .execute(&mut conn)?;
        Ok(deleted)
    }
}
