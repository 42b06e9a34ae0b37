use anyhow::Result;
use diesel::prelude::*;
use uuid::Uuid;

use crate::buses_repo::{PgPool, PgPooledConnection};
use crate::routes::{Route, RouteStop, StopListing};
use crate::schema::{route_stops, routes};

#[derive(Clone)]
pub struct RoutesRepository {
    pool: PgPool,
}

impl RoutesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn get_connection(&self) -> Result<PgPooledConnection> {
        self.pool
            .get()
            .map_err(|e| anyhow::anyhow!("Failed to get database connection: {}", e))
    }

    /// A route together with its stops in travel order.
    pub async fn get_route_with_stops(
        &self,
        route_id: Uuid,
    ) -> Result<Option<(Route, Vec<RouteStop>)>> {
        let mut conn = self.get_connection()?;

        let route = routes::table
            .find(route_id)
            .first::<Route>(&mut conn)
            .optional()?;
        let Some(route) = route else {
            return Ok(None);
        };

        let stops = route_stops::table
            .filter(route_stops::route_id.eq(route_id))
            .order(route_stops::stop_order.asc())
            .load::<RouteStop>(&mut conn)?;

        Ok(Some((route, stops)))
    }

    /// Every stop across all routes, grouped by route name and sorted by
    /// travel order within each route.
    pub async fn list_stops(&self) -> Result<Vec<StopListing>> {
        let mut conn = self.get_connection()?;
        let rows = route_stops::table
            .inner_join(routes::table)
            .order((routes::name.asc(), route_stops::stop_order.asc()))
            .select((
                route_stops::name,
                route_stops::latitude,
                route_stops::longitude,
                route_stops::stop_order,
                routes::name,
            ))
            .load::<StopListing>(&mut conn)?;
        Ok(rows)
    }
}
