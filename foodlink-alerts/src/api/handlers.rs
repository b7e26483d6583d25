//! HTTP request handlers
//!
//! Implements REST API endpoints for the alert engine.

use crate::api::server::AppContext;
use crate::engine::BatchResult;
use crate::history::HistoryDocument;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use foodlink_common::db::models::{Alert, AlertWithItem, Severity};
use foodlink_common::Error;
use serde::{Deserialize, Serialize};
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckParams {
    /// Look-ahead window override; falls back to the configured default
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    message: String,
    success: bool,
    data: BatchResult,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
    pub acknowledged: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    count: usize,
    alerts: Vec<AlertWithItem>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryListResponse {
    total: u64,
    count: usize,
    alerts: Vec<HistoryAlertView>,
}

/// API view of a history document.
///
/// `HistoryDocument` serializes `recorded_at` as a BSON datetime for
/// the Mongo boundary; this shape renders it as RFC 3339 like every
/// other timestamp in the API.
#[derive(Debug, Serialize)]
pub struct HistoryAlertView {
    alert_id: i64,
    item_id: i64,
    item_name: String,
    message: String,
    alert_date: NaiveDate,
    severity: Severity,
    days_until_expiry: i64,
    quantity: i64,
    category_name: Option<String>,
    donor_name: Option<String>,
    expiry_date: NaiveDate,
    recorded_at: DateTime<Utc>,
    acknowledged: bool,
}

impl From<HistoryDocument> for HistoryAlertView {
    fn from(doc: HistoryDocument) -> Self {
        HistoryAlertView {
            alert_id: doc.alert_id,
            item_id: doc.item_id,
            item_name: doc.item_name,
            message: doc.message,
            alert_date: doc.alert_date,
            severity: doc.severity,
            days_until_expiry: doc.days_until_expiry,
            quantity: doc.quantity,
            category_name: doc.category_name,
            donor_name: doc.donor_name,
            expiry_date: doc.expiry_date,
            recorded_at: doc.recorded_at,
            acknowledged: doc.acknowledged,
        }
    }
}

type HandlerError = (StatusCode, Json<StatusResponse>);

fn error_response(status: StatusCode, err: impl std::fmt::Display) -> HandlerError {
    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", err),
        }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "alert_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Alert Endpoints
// ============================================================================

/// POST /api/alerts/check - Trigger an expiry scan
///
/// Runs the dual-store alert generation batch and returns its
/// statistics. The batch completes even when some items fail; callers
/// inspect the counters for degraded runs.
pub async fn trigger_expiry_check(
    State(ctx): State<AppContext>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResponse>, HandlerError> {
    match ctx.engine.generate_alerts(params.days).await {
        Ok(result) => Ok(Json(CheckResponse {
            message: "Expiry check completed".to_string(),
            success: true,
            data: result,
        })),
        Err(Error::InvalidInput(msg)) => Err(error_response(StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            error!("Expiry check failed: {}", e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// PUT /api/alerts/:alert_id/acknowledge - Mark an alert acknowledged
///
/// Flips the primary flag and fans the update out to every matching
/// history document. 404 when the alert id is unknown.
pub async fn acknowledge_alert(
    State(ctx): State<AppContext>,
    Path(alert_id): Path<i64>,
) -> Result<Json<Alert>, HandlerError> {
    match ctx.engine.acknowledge(alert_id).await {
        Ok(Some(alert)) => Ok(Json(alert)),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Alert not found")),
        Err(e) => {
            error!("Failed to acknowledge alert {}: {}", alert_id, e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// GET /api/alerts - List alerts from the primary store
///
/// Joined with live item fields; only items still in stock appear.
pub async fn list_alerts(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<AlertListResponse>, HandlerError> {
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);

    match crate::db::alerts::list_alerts(&ctx.db_pool, params.acknowledged, params.skip, limit)
        .await
    {
        Ok(alerts) => Ok(Json(AlertListResponse {
            count: alerts.len(),
            alerts,
        })),
        Err(e) => {
            error!("Failed to list alerts: {}", e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

/// GET /api/alerts/history - Recent documents from the history store
///
/// Newest first. Responds 503 when the service started without a
/// reachable secondary store.
pub async fn list_history(
    State(ctx): State<AppContext>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryListResponse>, HandlerError> {
    if !ctx.history.is_available() {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "secondary store unavailable",
        ));
    }

    let limit = params.limit.unwrap_or(100).clamp(1, 1000);

    let alerts = ctx.history.recent(params.skip, limit).await.map_err(|e| {
        error!("Failed to query history store: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;
    let total = ctx.history.count().await.map_err(|e| {
        error!("Failed to count history store: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    let alerts: Vec<HistoryAlertView> = alerts.into_iter().map(Into::into).collect();

    Ok(Json(HistoryListResponse {
        total,
        count: alerts.len(),
        alerts,
    }))
}
