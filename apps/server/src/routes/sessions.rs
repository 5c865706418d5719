//! Shift (cashier session) endpoints.
//!
//! A cashier opens a shift before selling and closes it against a counted
//! drawer figure. The listing and detail endpoints are admin only; the
//! engine enforces that, these handlers just pass the caller through.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kasir_core::{CashierSession, SessionStatus};
use kasir_engine::{Page, Pos, SessionQuery};

use crate::auth::Caller;
use crate::error::ApiError;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// Float placed in the drawer at shift start, in rupiah.
    pub opening_cash: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    /// Cash physically counted at shift end, in rupiah.
    pub closing_cash: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListParams {
    pub cashier_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl From<SessionListParams> for SessionQuery {
    fn from(params: SessionListParams) -> Self {
        SessionQuery {
            cashier_id: params.cashier_id,
            status: params.status,
            date_from: params.date_from,
            date_to: params.date_to,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// Session as returned on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub cashier_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub opening_cash: i64,
    pub closing_cash: Option<i64>,
    pub expected_cash: Option<i64>,
    pub difference: Option<i64>,
    pub total_sales: i64,
    pub cash_total: i64,
    pub non_cash_total: i64,
    pub transaction_count: i64,
    pub status: SessionStatus,
    pub notes: Option<String>,
}

impl From<CashierSession> for SessionView {
    fn from(session: CashierSession) -> Self {
        SessionView {
            id: session.id,
            cashier_id: session.cashier_id,
            start_time: session.start_time,
            end_time: session.end_time,
            opening_cash: session.opening_cash,
            closing_cash: session.closing_cash,
            expected_cash: session.expected_cash,
            difference: session.difference,
            total_sales: session.total_sales,
            cash_total: session.cash_total,
            non_cash_total: session.non_cash_total,
            transaction_count: session.transaction_count,
            status: session.status,
            notes: session.notes,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /sessions`
pub async fn start(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = pos.sessions().start_session(&actor, req.opening_cash).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// `GET /sessions/active`
pub async fn active(
    State(pos): State<Pos>,
    Caller(actor): Caller,
) -> Result<Json<SessionView>, ApiError> {
    let session = pos.sessions().active_session(&actor.actor_id).await?;
    Ok(Json(session.into()))
}

/// `POST /sessions/end`
pub async fn end(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<EndSessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session = pos
        .sessions()
        .end_session(&actor, req.closing_cash, req.notes)
        .await?;
    Ok(Json(session.into()))
}

/// `GET /sessions`
pub async fn list(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Query(params): Query<SessionListParams>,
) -> Result<Json<Page<SessionView>>, ApiError> {
    let page = pos.sessions().list_sessions(&actor, &params.into()).await?;
    Ok(Json(page.map(SessionView::from)))
}

/// `GET /sessions/{id}`
pub async fn show(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = pos.sessions().get_session(&actor, &id).await?;
    Ok(Json(session.into()))
}
