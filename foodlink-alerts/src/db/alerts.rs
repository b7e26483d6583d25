//! Alert table access
//!
//! Durable writes to the authoritative store. The alerts table carries
//! a UNIQUE(item_id, alert_date) constraint; a violation during insert
//! is mapped to `Error::Conflict` so concurrent batch runs degrade to a
//! skip rather than a duplicate row.

use chrono::NaiveDate;
use foodlink_common::db::models::{Alert, AlertWithItem, ExpiringItem, Severity};
use foodlink_common::{Error, Result};
use sqlx::{Pool, Sqlite};

/// Advisory idempotency check: does an alert already exist for this
/// item on this calendar day?
///
/// Advisory only under concurrency; the uniqueness constraint on the
/// table is the authoritative guarantee.
pub async fn alert_exists_on(db: &Pool<Sqlite>, item_id: i64, date: NaiveDate) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM alerts WHERE item_id = ? AND alert_date = ?)",
    )
    .bind(item_id)
    .bind(date)
    .fetch_one(db)
    .await?;

    Ok(exists)
}

/// Deterministic alert message built from the item snapshot.
pub fn alert_message(item: &ExpiringItem, days_remaining: i64) -> String {
    format!(
        "Item '{}' (ID: {}) expires in {} days. Current quantity: {}. \
         Action required: Prioritize for donation.",
        item.name, item.item_id, days_remaining, item.quantity
    )
}

/// Insert a new alert for `item` dated `today`.
///
/// Returns `Error::Conflict` when a concurrent writer already created
/// today's alert for this item; any other persistence error surfaces
/// as `Error::Database` and is fatal for this item only.
pub async fn create_alert(
    db: &Pool<Sqlite>,
    item: &ExpiringItem,
    severity: Severity,
    today: NaiveDate,
) -> Result<Alert> {
    let days_remaining = item.days_until_expiry(today);
    let message = alert_message(item, days_remaining);

    let result = sqlx::query(
        r#"
        INSERT INTO alerts (item_id, message, severity, alert_date, acknowledged)
        VALUES (?, ?, ?, ?, 0)
        "#,
    )
    .bind(item.item_id)
    .bind(&message)
    .bind(severity)
    .bind(today)
    .execute(db)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Conflict(format!(
                "alert already exists for item {} on {}",
                item.item_id, today
            ))
        } else {
            Error::Database(e)
        }
    })?;

    let alert_id = result.last_insert_rowid();

    let alert = sqlx::query_as::<_, Alert>(
        "SELECT alert_id, item_id, message, severity, alert_date, acknowledged, created_at \
         FROM alerts WHERE alert_id = ?",
    )
    .bind(alert_id)
    .fetch_one(db)
    .await?;

    Ok(alert)
}

/// Fetch an alert by id.
pub async fn get_alert(db: &Pool<Sqlite>, alert_id: i64) -> Result<Option<Alert>> {
    let alert = sqlx::query_as::<_, Alert>(
        "SELECT alert_id, item_id, message, severity, alert_date, acknowledged, created_at \
         FROM alerts WHERE alert_id = ?",
    )
    .bind(alert_id)
    .fetch_optional(db)
    .await?;

    Ok(alert)
}

/// Flip an alert's acknowledged flag to true (one-way, terminal).
///
/// Returns the updated alert, or `None` if the id is unknown.
pub async fn acknowledge_alert(db: &Pool<Sqlite>, alert_id: i64) -> Result<Option<Alert>> {
    let updated = sqlx::query("UPDATE alerts SET acknowledged = 1 WHERE alert_id = ?")
        .bind(alert_id)
        .execute(db)
        .await?;

    if updated.rows_affected() == 0 {
        return Ok(None);
    }

    get_alert(db, alert_id).await
}

/// List alerts joined with live item fields, newest first.
///
/// Only alerts whose item is still in stock (`quantity > 0`) are
/// returned; `acknowledged` optionally filters by flag state.
pub async fn list_alerts(
    db: &Pool<Sqlite>,
    acknowledged: Option<bool>,
    skip: i64,
    limit: i64,
) -> Result<Vec<AlertWithItem>> {
    let rows = sqlx::query_as::<_, AlertWithItem>(
        r#"
        SELECT
            a.alert_id,
            a.item_id,
            a.message,
            a.severity,
            a.alert_date,
            a.acknowledged,
            a.created_at,
            i.name AS item_name,
            i.quantity,
            i.expiry_date
        FROM alerts a
        JOIN items i ON i.item_id = a.item_id
        WHERE i.quantity > 0
          AND (? IS NULL OR a.acknowledged = ?)
        ORDER BY a.created_at DESC, a.alert_id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(acknowledged)
    .bind(acknowledged)
    .bind(limit)
    .bind(skip)
    .fetch_all(db)
    .await?;

    Ok(rows)
}
