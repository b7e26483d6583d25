//! Expiry alert generation engine
//!
//! Orchestrates scan -> idempotency check -> severity -> primary write
//! -> history mirror. Each item is processed in isolation: one item's
//! failure never aborts the batch, and a secondary-store failure never
//! rolls back or blocks the primary write.

use chrono::{DateTime, Local, NaiveDate, Utc};
use foodlink_common::db::models::{Alert, ExpiringItem, Severity};
use foodlink_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db;
use crate::history::{HistoryDocument, HistorySink};

/// Statistics for one batch run.
///
/// The batch always completes and returns counts; callers inspect the
/// counters to detect degraded runs rather than an overall boolean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Eligible items examined by the scan.
    pub checked: usize,
    /// Alerts written durably to the primary store.
    pub created_primary: usize,
    /// Snapshots mirrored to the history store.
    pub created_secondary: usize,
    /// Items skipped because today's alert already existed.
    pub skipped: usize,
    /// Items whose primary write failed.
    pub failed: usize,
    /// Primary successes whose mirror write failed.
    pub mirror_failed: usize,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of processing a single candidate item.
enum ItemOutcome {
    Created { mirrored: bool },
    Skipped,
    Failed,
}

/// Dual-store alert coordinator.
///
/// Holds the primary pool and the history capability chosen at
/// startup; invocations are synchronous per call and safe to overlap
/// (the alerts table's uniqueness constraint resolves the
/// check-then-insert race to a skip).
pub struct AlertEngine {
    db: Pool<Sqlite>,
    history: Arc<dyn HistorySink>,
}

impl AlertEngine {
    pub fn new(db: Pool<Sqlite>, history: Arc<dyn HistorySink>) -> Self {
        AlertEngine { db, history }
    }

    /// Generate alerts for items expiring within the threshold window.
    ///
    /// `threshold_days` falls back to the `expiry_check_days` setting
    /// when absent.
    pub async fn generate_alerts(&self, threshold_days: Option<i64>) -> Result<BatchResult> {
        let threshold = match threshold_days {
            Some(days) => days,
            None => db::settings::expiry_check_days(&self.db).await?,
        };
        if threshold <= 0 {
            return Err(Error::InvalidInput(format!(
                "threshold_days must be positive, got {}",
                threshold
            )));
        }

        let today = Local::now().date_naive();
        self.generate_alerts_on(today, threshold).await
    }

    /// Run one batch against an explicit calendar day.
    ///
    /// The day is computed once per batch so a run spanning midnight
    /// stays internally consistent.
    pub async fn generate_alerts_on(
        &self,
        today: NaiveDate,
        threshold_days: i64,
    ) -> Result<BatchResult> {
        let items = db::items::scan_expiring(&self.db, today, threshold_days).await?;

        let mut result = BatchResult {
            checked: items.len(),
            created_primary: 0,
            created_secondary: 0,
            skipped: 0,
            failed: 0,
            mirror_failed: 0,
            timestamp: Utc::now(),
        };

        for item in &items {
            match self.process_item(item, today).await {
                ItemOutcome::Created { mirrored } => {
                    result.created_primary += 1;
                    if mirrored {
                        result.created_secondary += 1;
                    } else {
                        result.mirror_failed += 1;
                    }
                }
                ItemOutcome::Skipped => result.skipped += 1,
                ItemOutcome::Failed => result.failed += 1,
            }
        }

        info!(
            checked = result.checked,
            created_primary = result.created_primary,
            created_secondary = result.created_secondary,
            skipped = result.skipped,
            failed = result.failed,
            mirror_failed = result.mirror_failed,
            "Alert generation completed"
        );

        Ok(result)
    }

    /// Process one candidate item in isolation.
    ///
    /// All failure modes collapse into an explicit outcome value so the
    /// batch loop never aborts on a poison item.
    async fn process_item(&self, item: &ExpiringItem, today: NaiveDate) -> ItemOutcome {
        // Advisory check; the insert's uniqueness constraint is the
        // authoritative guard
        match db::alerts::alert_exists_on(&self.db, item.item_id, today).await {
            Ok(true) => return ItemOutcome::Skipped,
            Ok(false) => {}
            Err(e) => {
                error!("Error checking existing alert for item {}: {}", item.item_id, e);
                return ItemOutcome::Failed;
            }
        }

        let days_remaining = item.days_until_expiry(today);
        let severity = Severity::from_days_remaining(days_remaining);

        let alert = match db::alerts::create_alert(&self.db, item, severity, today).await {
            Ok(alert) => alert,
            Err(Error::Conflict(_)) => {
                // A concurrent run won the insert race; benign
                return ItemOutcome::Skipped;
            }
            Err(e) => {
                error!("Error creating alert for item {}: {}", item.item_id, e);
                return ItemOutcome::Failed;
            }
        };

        info!("Alert created for item {}: {}", item.item_id, item.name);

        let mirrored = self.mirror_alert(item, &alert, days_remaining).await;
        ItemOutcome::Created { mirrored }
    }

    /// Best-effort history mirror. Never retried within the batch and
    /// never rolls back the primary write.
    async fn mirror_alert(&self, item: &ExpiringItem, alert: &Alert, days_remaining: i64) -> bool {
        let doc = HistoryDocument::snapshot(item, alert, days_remaining);
        match self.history.append(doc).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to mirror alert {} to history store: {}", alert.alert_id, e);
                false
            }
        }
    }

    /// Acknowledge an alert and propagate the flag to the history log.
    ///
    /// Returns the updated alert, or `None` when the id is unknown. The
    /// secondary update matches all documents sharing the correlation
    /// key; its failure is logged and does not undo the primary update.
    pub async fn acknowledge(&self, alert_id: i64) -> Result<Option<Alert>> {
        let alert = match db::alerts::acknowledge_alert(&self.db, alert_id).await? {
            Some(alert) => alert,
            None => return Ok(None),
        };

        match self.history.acknowledge_all(alert_id).await {
            Ok(modified) => {
                info!("Acknowledged alert {} ({} history documents updated)", alert_id, modified);
            }
            Err(e) => {
                warn!("Failed to acknowledge alert {} in history store: {}", alert_id, e);
            }
        }

        Ok(Some(alert))
    }
}
