mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::env;
use tracing::info;

use bustrack::web::PgPool;

// Embed migrations into the binary
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[derive(Parser)]
#[command(name = "bustrack")]
#[command(about = "Fleet GPS ingestion and live trip tracking service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingest and live-view HTTP service
    Serve {
        /// Interface to bind the API listener to
        #[arg(long, default_value = "0.0.0.0")]
        interface: String,
        /// Port for the API listener
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Port for the Prometheus metrics listener; omit to disable it
        #[arg(long)]
        metrics_port: Option<u16>,
    },
    /// Delete location history older than the retention window
    PruneHistory {
        /// Retention in days
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Load a demo route, stops and vehicles for local development
    SeedDemo,
}

fn create_pool(database_url: &str) -> Result<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(10)
        .build(manager)
        .context("Failed to create database connection pool")
}

fn run_migrations(pool: &PgPool) -> Result<()> {
    let mut conn = pool.get().context("Failed to get database connection")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;
    if !applied.is_empty() {
        info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let database_url = env::var("DATABASE_URL")
        .context("DATABASE_URL must be set in environment variables")?;
    let pool = create_pool(&database_url)?;
    run_migrations(&pool)?;

    match cli.command {
        Commands::Serve {
            interface,
            port,
            metrics_port,
        } => {
            let nats_url = env::var("NATS_URL").ok();
            commands::handle_serve(interface, port, nats_url, metrics_port, pool).await
        }
        Commands::PruneHistory { days } => commands::handle_prune_history(days, pool).await,
        Commands::SeedDemo => commands::handle_seed_demo(&pool).await,
    }
}
