use anyhow::{Context, Result};
use diesel::prelude::*;
use tracing::info;
use uuid::Uuid;

use bustrack::web::PgPool;

const DEMO_ROUTE_NAME: &str = "Campus - City";

/// Seed a demo route, its stops and two vehicles for local development.
///
/// Idempotent: re-running refreshes the demo rows instead of duplicating
/// them, so it is safe against a database that already has real data.
pub async fn handle_seed_demo(pool: &PgPool) -> Result<()> {
    info!("Starting demo data seed");

    let mut conn = pool.get().context("Failed to get database connection")?;

    let route_id = create_demo_route(&mut conn)?;
    create_demo_stops(&mut conn, route_id)?;
    create_demo_buses(&mut conn, route_id)?;

    info!("Demo data seed completed successfully");
    info!("Demo device credentials:");
    info!("  bus-101 / demo-key-101");
    info!("  bus-102 / demo-key-102");

    Ok(())
}

fn create_demo_route(conn: &mut PgConnection) -> Result<Uuid> {
    use bustrack::schema::routes::dsl::*;

    if let Some(existing) = routes
        .filter(name.eq(DEMO_ROUTE_NAME))
        .select(id)
        .first::<Uuid>(conn)
        .optional()
        .context("Failed to look up demo route")?
    {
        info!("Demo route already present (ID: {})", existing);
        return Ok(existing);
    }

    let route_id_value = Uuid::new_v4();
    diesel::insert_into(routes)
        .values((
            id.eq(route_id_value),
            name.eq(DEMO_ROUTE_NAME),
            color.eq("#1e88e5"),
            description.eq(Some("Demo loop between the campus and the city terminal")),
            created_at.eq(chrono::Utc::now()),
            updated_at.eq(chrono::Utc::now()),
        ))
        .execute(conn)
        .context("Failed to create demo route")?;

    info!(
        "Created demo route: {} (ID: {})",
        DEMO_ROUTE_NAME, route_id_value
    );
    Ok(route_id_value)
}

fn create_demo_stops(conn: &mut PgConnection, route_id_value: Uuid) -> Result<()> {
    use bustrack::schema::route_stops::dsl::*;

    // A straight north-south line with roughly 1 km between stops.
    let demo_stops = [
        ("Campus Gate", 25.6953, 88.6581, 1),
        ("Science Building", 25.7043, 88.6581, 2),
        ("Market Square", 25.7133, 88.6581, 3),
        ("River Bridge", 25.7223, 88.6581, 4),
        ("City Terminal", 25.7313, 88.6581, 5),
    ];

    for (stop_name, lat_value, lng_value, order_value) in demo_stops {
        diesel::insert_into(route_stops)
            .values((
                route_id.eq(route_id_value),
                name.eq(stop_name),
                latitude.eq(lat_value),
                longitude.eq(lng_value),
                stop_order.eq(order_value),
            ))
            .on_conflict((route_id, stop_order))
            .do_update()
            .set((
                name.eq(stop_name),
                latitude.eq(lat_value),
                longitude.eq(lng_value),
            ))
            .execute(conn)
            .context("Failed to create demo stop")?;

        info!("Created demo stop: {} (order {})", stop_name, order_value);
    }

    Ok(())
}

fn create_demo_buses(conn: &mut PgConnection, route_id_value: Uuid) -> Result<()> {
    use bustrack::schema::buses::dsl::*;

    let demo_buses = [
        ("bus-101", "Basanti", "demo-key-101"),
        ("bus-102", "Parbati", "demo-key-102"),
    ];

    for (device_id_value, bus_name, key) in demo_buses {
        diesel::insert_into(buses)
            .values((
                device_id.eq(device_id_value),
                name.eq(bus_name),
                route_id.eq(Some(route_id_value)),
                api_key.eq(key),
                is_active.eq(true),
            ))
            .on_conflict(device_id)
            .do_update()
            .set((
                name.eq(bus_name),
                route_id.eq(Some(route_id_value)),
                api_key.eq(key),
                is_active.eq(true),
                updated_at.eq(chrono::Utc::now()),
            ))
            .execute(conn)
            .context("Failed to create demo bus")?;

        info!("Created demo bus: {} ({})", bus_name, device_id_value);
    }

    Ok(())
}
