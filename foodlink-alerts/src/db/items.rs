//! Inventory scan queries
//!
//! Read-only access to the items table. The alert engine never mutates
//! inventory; rows are selected as a single consistent snapshot per
//! scan.

use chrono::{Duration, NaiveDate};
use foodlink_common::db::models::ExpiringItem;
use foodlink_common::Result;
use sqlx::{Pool, Sqlite};

/// Select items eligible for an expiry alert.
///
/// Eligible means `quantity > 0` and `today <= expiry_date <= today +
/// threshold_days`. Ordering is not semantically significant.
pub async fn scan_expiring(
    db: &Pool<Sqlite>,
    today: NaiveDate,
    threshold_days: i64,
) -> Result<Vec<ExpiringItem>> {
    let horizon = today + Duration::days(threshold_days);

    let items = sqlx::query_as::<_, ExpiringItem>(
        r#"
        SELECT
            i.item_id,
            i.name,
            i.quantity,
            i.expiry_date,
            c.category_name,
            d.name AS donor_name
        FROM items i
        LEFT JOIN categories c ON c.category_id = i.category_id
        LEFT JOIN donors d ON d.donor_id = i.donor_id
        WHERE i.quantity > 0
          AND i.expiry_date >= ?
          AND i.expiry_date <= ?
        "#,
    )
    .bind(today)
    .bind(horizon)
    .fetch_all(db)
    .await?;

    Ok(items)
}
