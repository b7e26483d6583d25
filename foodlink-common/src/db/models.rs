//! Database models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Alert urgency tier, ordered LOW < MEDIUM < HIGH < CRITICAL.
///
/// Stored as TEXT in the alerts table and computed purely from the
/// number of days remaining until an item expires.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify urgency from days remaining until expiry.
    ///
    /// Total and deterministic. Already-expired items are excluded by
    /// the scan and never reach this function.
    pub fn from_days_remaining(days: i64) -> Self {
        if days <= 3 {
            Severity::Critical
        } else if days <= 7 {
            Severity::High
        } else if days <= 14 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Snapshot of an inventory item eligible for an expiry alert.
///
/// Read-only here: inventory rows are owned by the inventory service,
/// this crate only selects them for alert generation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExpiringItem {
    pub item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub category_name: Option<String>,
    pub donor_name: Option<String>,
}

impl ExpiringItem {
    /// Days from `today` to this item's expiry date.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        self.expiry_date.signed_duration_since(today).num_days()
    }
}

/// Canonical alert record in the primary store.
///
/// At most one row exists per (item_id, alert_date); the table carries
/// a UNIQUE constraint enforcing this under concurrent writers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Alert {
    pub alert_id: i64,
    pub item_id: i64,
    pub message: String,
    pub severity: Severity,
    pub alert_date: NaiveDate,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

/// Alert joined with the live item fields used by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AlertWithItem {
    pub alert_id: i64,
    pub item_id: i64,
    pub message: String,
    pub severity: Severity,
    pub alert_date: NaiveDate,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub item_name: String,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_boundaries_are_exact() {
        assert_eq!(Severity::from_days_remaining(0), Severity::Critical);
        assert_eq!(Severity::from_days_remaining(3), Severity::Critical);
        assert_eq!(Severity::from_days_remaining(4), Severity::High);
        assert_eq!(Severity::from_days_remaining(7), Severity::High);
        assert_eq!(Severity::from_days_remaining(8), Severity::Medium);
        assert_eq!(Severity::from_days_remaining(14), Severity::Medium);
        assert_eq!(Severity::from_days_remaining(15), Severity::Low);
        assert_eq!(Severity::from_days_remaining(30), Severity::Low);
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn days_until_expiry_counts_calendar_days() {
        let item = ExpiringItem {
            item_id: 1,
            name: "Milk".to_string(),
            quantity: 4,
            expiry_date: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            category_name: None,
            donor_name: None,
        };
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(item.days_until_expiry(today), 5);
    }
}
