//! Database initialization
//!
//! Creates the SQLite database on first run, applies the schema
//! idempotently and seeds default settings. Safe to call on every
//! startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers with one writer, needed when a
    // manual trigger overlaps a scheduled batch run
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Migrations (idempotent - safe to call multiple times)
    create_donors_table(&pool).await?;
    create_categories_table(&pool).await?;
    create_items_table(&pool).await?;
    create_alerts_table(&pool).await?;
    create_settings_table(&pool).await?;

    init_default_settings(&pool).await?;

    Ok(pool)
}

async fn create_donors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS donors (
            donor_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            contact TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            category_id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the items table
///
/// Inventory rows are owned by the inventory service; the alert engine
/// only reads them during expiry scans.
pub async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            item_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            expiry_date TEXT NOT NULL,
            category_id INTEGER REFERENCES categories(category_id) ON DELETE SET NULL,
            donor_id INTEGER REFERENCES donors(donor_id) ON DELETE SET NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (quantity >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Expiry scans filter on expiry_date and quantity
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_expiry ON items(expiry_date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_donor ON items(donor_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the alerts table
///
/// The UNIQUE(item_id, alert_date) constraint is the authoritative
/// guarantee of at most one alert per item per calendar day; the
/// advisory pre-check in the engine is only an optimization.
pub async fn create_alerts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            alert_id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL REFERENCES items(item_id) ON DELETE CASCADE,
            message TEXT NOT NULL,
            severity TEXT NOT NULL CHECK (severity IN ('LOW', 'MEDIUM', 'HIGH', 'CRITICAL')),
            alert_date TEXT NOT NULL,
            acknowledged INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (item_id, alert_date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_date ON alerts(alert_date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_acknowledged ON alerts(acknowledged)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist with default values and resets
/// NULL values back to defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Expiry scan look-ahead window in days
    ensure_setting(pool, "expiry_check_days", "30").await?;

    // HTTP server settings
    ensure_setting(pool, "http_request_timeout_ms", "30000").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // INSERT OR IGNORE handles concurrent initialization races:
        // multiple tasks may pass the exists check simultaneously
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_is_idempotent_and_seeds_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foodlink.db");

        let pool = init_database(&path).await.unwrap();
        // Second init over the same file must not fail or duplicate rows
        let pool2 = init_database(&path).await.unwrap();
        drop(pool2);

        let threshold: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'expiry_check_days'")
                .fetch_optional(&pool)
                .await
                .unwrap();
        assert_eq!(threshold.as_deref(), Some("30"));
    }

    #[tokio::test]
    async fn alerts_unique_constraint_rejects_same_item_and_day() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("t.db")).await.unwrap();

        sqlx::query("INSERT INTO items (name, quantity, expiry_date) VALUES ('Rice', 5, '2026-09-10')")
            .execute(&pool)
            .await
            .unwrap();

        let insert = "INSERT INTO alerts (item_id, message, severity, alert_date) VALUES (1, 'm', 'HIGH', '2026-08-29')";
        sqlx::query(insert).execute(&pool).await.unwrap();
        let err = sqlx::query(insert).execute(&pool).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::Database(ref db) if db.is_unique_violation()));
    }
}
