//! Settings database access
//!
//! Read settings from the settings table (key-value store). All
//! settings are global/system-wide.

use foodlink_common::Result;
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Compiled fallback when the setting row is missing or unparseable.
pub const DEFAULT_EXPIRY_CHECK_DAYS: i64 = 30;

/// Look-ahead window for expiry scans, in days.
///
/// Resolution order: `expiry_check_days` setting row, then the
/// compiled default.
pub async fn expiry_check_days(db: &Pool<Sqlite>) -> Result<i64> {
    Ok(get_setting::<i64>(db, "expiry_check_days")
        .await?
        .unwrap_or(DEFAULT_EXPIRY_CHECK_DAYS))
}

/// Get a typed setting value, `None` if absent, NULL, or unparseable.
async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    Ok(value.flatten().and_then(|v| v.parse().ok()))
}
