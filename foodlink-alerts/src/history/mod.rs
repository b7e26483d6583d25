//! Secondary (history) store
//!
//! The history log holds denormalized alert snapshots mirrored
//! at-least-once: retried appends may produce multiple documents
//! sharing one `alert_id`, so every update operates on "all documents
//! with this correlation key", never "exactly one". Documents are
//! append-only and intentionally allowed to diverge from current
//! inventory state except for the acknowledged flag.

pub mod mongo;

pub use mongo::MongoHistory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use foodlink_common::db::models::{Alert, ExpiringItem, Severity};
use foodlink_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Denormalized snapshot of an alert at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDocument {
    /// Correlation key back to the primary alert row; not unique here.
    pub alert_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub message: String,
    pub alert_date: NaiveDate,
    pub severity: Severity,
    pub days_until_expiry: i64,
    pub quantity: i64,
    pub category_name: Option<String>,
    pub donor_name: Option<String>,
    pub expiry_date: NaiveDate,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub recorded_at: DateTime<Utc>,
    pub acknowledged: bool,
}

impl HistoryDocument {
    /// Snapshot item and alert fields at this instant.
    pub fn snapshot(item: &ExpiringItem, alert: &Alert, days_until_expiry: i64) -> Self {
        HistoryDocument {
            alert_id: alert.alert_id,
            item_id: item.item_id,
            item_name: item.name.clone(),
            message: alert.message.clone(),
            alert_date: alert.alert_date,
            severity: alert.severity,
            days_until_expiry,
            quantity: item.quantity,
            category_name: item.category_name.clone(),
            donor_name: item.donor_name.clone(),
            expiry_date: item.expiry_date,
            recorded_at: Utc::now(),
            acknowledged: false,
        }
    }
}

/// Best-effort sink for history documents.
///
/// The concrete sink is chosen once at startup: `MongoHistory` when the
/// store is reachable, `DisabledHistory` otherwise. Callers never probe
/// availability per call; a disabled sink fails appends immediately
/// without I/O.
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Capability flag, fixed at construction.
    fn is_available(&self) -> bool;

    /// Append one document. At-least-once: the caller may retry on a
    /// later run, duplicates per alert_id are legitimate.
    async fn append(&self, doc: HistoryDocument) -> Result<()>;

    /// Set acknowledged on every document whose correlation key equals
    /// `alert_id` (zero, one, or many matches). Returns the number of
    /// documents modified.
    async fn acknowledge_all(&self, alert_id: i64) -> Result<u64>;

    /// Most recent documents, newest first.
    async fn recent(&self, skip: u64, limit: i64) -> Result<Vec<HistoryDocument>>;

    /// Total document count.
    async fn count(&self) -> Result<u64>;
}

/// Absent-capability sink used when the secondary store was not
/// reachable at startup. Appends fail without attempting I/O;
/// acknowledgement fan-out matches zero documents.
pub struct DisabledHistory;

#[async_trait]
impl HistorySink for DisabledHistory {
    fn is_available(&self) -> bool {
        false
    }

    async fn append(&self, _doc: HistoryDocument) -> Result<()> {
        Err(Error::History("secondary store unavailable".to_string()))
    }

    async fn acknowledge_all(&self, _alert_id: i64) -> Result<u64> {
        Ok(0)
    }

    async fn recent(&self, _skip: u64, _limit: i64) -> Result<Vec<HistoryDocument>> {
        Err(Error::History("secondary store unavailable".to_string()))
    }

    async fn count(&self) -> Result<u64> {
        Err(Error::History("secondary store unavailable".to_string()))
    }
}
