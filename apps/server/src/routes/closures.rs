//! Daily closure endpoints. All admin only, enforced in the engine.
//!
//! Closing a date freezes its sales totals against a physically counted
//! cash figure and posts the cash takings into the drawer. Deleting a
//! closure reopens the date and reverses that posting.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kasir_core::{DailyClosure, DaySalesSummary};
use kasir_engine::{DayStatus, Pos};

use super::sessions::SessionView;
use crate::auth::Caller;
use crate::error::ApiError;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseDayRequest {
    /// Business date to close, `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Cash physically counted in the drawer, in rupiah.
    pub physical_cash_count: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub date: NaiveDate,
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureView {
    pub id: String,
    pub closure_date: NaiveDate,
    pub closed_by: String,
    pub closed_at: DateTime<Utc>,
    pub system_cash_total: i64,
    pub system_qris_total: i64,
    pub system_total_sales: i64,
    pub total_transactions: i64,
    pub physical_cash_count: i64,
    pub cash_difference: i64,
    pub first_transaction_at: Option<DateTime<Utc>>,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl From<DailyClosure> for ClosureView {
    fn from(closure: DailyClosure) -> Self {
        ClosureView {
            id: closure.id,
            closure_date: closure.closure_date,
            closed_by: closure.closed_by,
            closed_at: closure.closed_at,
            system_cash_total: closure.system_cash_total,
            system_qris_total: closure.system_qris_total,
            system_total_sales: closure.system_total_sales,
            total_transactions: closure.total_transactions,
            physical_cash_count: closure.physical_cash_count,
            cash_difference: closure.cash_difference,
            first_transaction_at: closure.first_transaction_at,
            last_transaction_at: closure.last_transaction_at,
            notes: closure.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummaryView {
    pub cash_total: i64,
    pub qris_total: i64,
    pub total_sales: i64,
    pub transaction_count: i64,
    pub first_transaction_at: Option<DateTime<Utc>>,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

impl From<DaySalesSummary> for DaySummaryView {
    fn from(summary: DaySalesSummary) -> Self {
        DaySummaryView {
            cash_total: summary.cash_total,
            qris_total: summary.qris_total,
            total_sales: summary.total_sales,
            transaction_count: summary.transaction_count,
            first_transaction_at: summary.first_transaction_at,
            last_transaction_at: summary.last_transaction_at,
        }
    }
}

/// One business date at a glance: closed or not, live totals, blockers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatusView {
    pub date: NaiveDate,
    pub is_closed: bool,
    pub closure: Option<ClosureView>,
    pub live: DaySummaryView,
    pub open_sessions: Vec<SessionView>,
}

impl From<DayStatus> for DayStatusView {
    fn from(status: DayStatus) -> Self {
        DayStatusView {
            date: status.date,
            is_closed: status.is_closed,
            closure: status.closure.map(Into::into),
            live: status.live.into(),
            open_sessions: status.open_sessions.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /closures`
pub async fn close(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<CloseDayRequest>,
) -> Result<(StatusCode, Json<ClosureView>), ApiError> {
    let closure = pos
        .closures()
        .close_day(&actor, req.date, req.physical_cash_count, req.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(closure.into())))
}

/// `DELETE /closures/{id}`
///
/// Returns the removed closure record.
pub async fn reopen(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<Json<ClosureView>, ApiError> {
    let closure = pos.closures().reopen_day(&actor, &id).await?;
    Ok(Json(closure.into()))
}

/// `GET /closures/status?date=YYYY-MM-DD`
pub async fn status(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Query(params): Query<StatusParams>,
) -> Result<Json<DayStatusView>, ApiError> {
    let status = pos.closures().status(&actor, params.date).await?;
    Ok(Json(status.into()))
}
