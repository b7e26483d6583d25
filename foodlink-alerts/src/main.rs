//! FoodLink Alert Engine - Main entry point
//!
//! Expiry alert generation and dual-store synchronization service.
//! Canonical alerts live in SQLite; denormalized history snapshots are
//! mirrored best-effort to MongoDB. When MongoDB is unreachable at
//! startup the service runs in primary-only mode.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use foodlink_alerts::api;
use foodlink_alerts::engine::AlertEngine;
use foodlink_alerts::history::{DisabledHistory, HistorySink, MongoHistory};

/// Command-line arguments for foodlink-alerts
#[derive(Parser, Debug)]
#[command(name = "foodlink-alerts")]
#[command(about = "Expiry alert microservice for FoodLink")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "FOODLINK_ALERTS_PORT")]
    port: u16,

    /// Path to the SQLite database (falls back to config file / OS default)
    #[arg(short, long, env = "FOODLINK_DATABASE")]
    database: Option<String>,

    /// MongoDB connection URI for the history store
    #[arg(long, default_value = "mongodb://localhost:27017", env = "FOODLINK_MONGO_URI")]
    mongo_uri: String,

    /// MongoDB database name for the history store
    #[arg(long, default_value = "foodlink_history", env = "FOODLINK_MONGO_DATABASE")]
    mongo_database: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodlink_alerts=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting FoodLink Alert Engine on port {}", args.port);

    let db_path =
        foodlink_common::config::resolve_database_path(args.database.as_deref(), "FOODLINK_DATABASE")
            .context("Failed to resolve database path")?;
    info!("Database: {}", db_path.display());

    let db_pool = foodlink_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    // Secondary store capability, decided once at startup
    let history: Arc<dyn HistorySink> =
        match MongoHistory::connect(&args.mongo_uri, &args.mongo_database).await {
            Ok(mongo) => Arc::new(mongo),
            Err(e) => {
                warn!("History store unavailable, running primary-only: {}", e);
                Arc::new(DisabledHistory)
            }
        };

    let engine = Arc::new(AlertEngine::new(db_pool.clone(), history.clone()));

    let ctx = api::AppContext {
        engine,
        db_pool,
        history,
    };

    api::server::run(ctx, args.port)
        .await
        .context("Server error")?;

    Ok(())
}
