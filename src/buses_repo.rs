use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use uuid::Uuid;

use crate::bus_locations::{BusLocation, NewBusLocation, is_novel_position};
use crate::buses::Bus;
use crate::schema::{bus_locations, buses};
use crate::trip_engine::{AcceptedFix, TripState};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct BusesRepository {
    pool: PgPool,
}

impl BusesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn get_connection(&self) -> Result<PgPooledConnection> {
        self.pool
            .get()
            .map_err(|e| anyhow::anyhow!("Failed to get database connection: {}", e))
    }

    /// Look up a vehicle by the device id it reports with.
    pub async fn get_by_device_id(&self, device_id: &str) -> Result<Option<Bus>> {
        let mut conn = self.get_connection()?;
        let bus = buses::table
            .filter(buses::device_id.eq(device_id))
            .first::<Bus>(&mut conn)
            .optional()?;
        Ok(bus)
    }

    /// All vehicles currently in service, for the live query path.
    pub async fn get_active(&self) -> Result<Vec<Bus>> {
        let mut conn = self.get_connection()?;
        let rows = buses::table
            .filter(buses::is_active.eq(true))
            .order(buses::name.asc())
            .load::<Bus>(&mut conn)?;
        Ok(rows)
    }

    /// Commit one accepted update: the vehicle's live state, plus a history
    /// row when the fix moved far enough from the last persisted sample.
    /// Both writes share one transaction so a failure leaves no partial
    /// state behind. Returns whether a history row was written.
    pub async fn commit_update(
        &self,
        bus_id: Uuid,
        fix: AcceptedFix,
        state: &TripState,
        seen_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = self.get_connection()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            diesel::update(buses::table.find(bus_id))
                .set((
                    buses::latitude.eq(fix.latitude),
                    buses::longitude.eq(fix.longitude),
                    buses::speed_kmh.eq(fix.speed_kmh),
                    buses::direction.eq(state.direction),
                    buses::trip_status.eq(state.trip_status),
                    buses::progress_kind.eq(state.progress.kind()),
                    buses::progress_order.eq(state.progress.order()),
                    buses::last_contact.eq(seen_at),
                    buses::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            let prior = bus_locations::table
                .filter(bus_locations::bus_id.eq(bus_id))
                .order(bus_locations::recorded_at.desc())
                .first::<BusLocation>(conn)
                .optional()?;

            let sampled = is_novel_position(prior.as_ref(), fix.latitude, fix.longitude);
            if sampled {
                diesel::insert_into(bus_locations::table)
                    .values(&NewBusLocation {
                        bus_id,
                        latitude: fix.latitude,
                        longitude: fix.longitude,
                        speed_kmh: fix.speed_kmh,
                        direction: state.direction,
                    })
                    .execute(conn)?;
            }

            Ok(sampled)
        })
    }
}
