//! Cash drawer endpoints.
//!
//! The drawer is a single store-wide balance. Deposits and withdrawals are
//! the routine movements; adjust and set-balance are the correction pair
//! and may push the balance anywhere.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kasir_core::{CashDrawerMovement, DrawerMovementKind};
use kasir_engine::{DrawerSummary, Page, Pos};

use crate::auth::Caller;
use crate::error::ApiError;

// =============================================================================
// Requests
// =============================================================================

/// Body for deposit, withdraw and adjust.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashAmountRequest {
    pub amount: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBalanceRequest {
    /// Absolute counted balance, never negative.
    pub target: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerMovementParams {
    pub kind: Option<DrawerMovementKind>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerMovementView {
    pub id: String,
    pub kind: DrawerMovementKind,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<CashDrawerMovement> for DrawerMovementView {
    fn from(movement: CashDrawerMovement) -> Self {
        DrawerMovementView {
            id: movement.id,
            kind: movement.kind,
            amount: movement.amount,
            balance_before: movement.balance_before,
            balance_after: movement.balance_after,
            reference: movement.reference,
            notes: movement.notes,
            actor_id: movement.actor_id,
            created_at: movement.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerSummaryView {
    pub date: NaiveDate,
    pub current_balance: i64,
    pub today_cash_in: i64,
    pub today_cash_out: i64,
    pub today_adjustment: i64,
    pub open_sessions: i64,
}

impl From<DrawerSummary> for DrawerSummaryView {
    fn from(summary: DrawerSummary) -> Self {
        DrawerSummaryView {
            date: summary.date,
            current_balance: summary.current_balance,
            today_cash_in: summary.today_cash_in,
            today_cash_out: summary.today_cash_out,
            today_adjustment: summary.today_adjustment,
            open_sessions: summary.open_sessions,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /drawer`
pub async fn summary(
    State(pos): State<Pos>,
    Caller(_actor): Caller,
) -> Result<Json<DrawerSummaryView>, ApiError> {
    let summary = pos.drawer().summary().await?;
    Ok(Json(summary.into()))
}

/// `GET /drawer/movements`
pub async fn movements(
    State(pos): State<Pos>,
    Caller(_actor): Caller,
    Query(params): Query<DrawerMovementParams>,
) -> Result<Json<Page<DrawerMovementView>>, ApiError> {
    let page = pos
        .drawer()
        .movements(params.kind, params.page, params.page_size)
        .await?;
    Ok(Json(page.map(DrawerMovementView::from)))
}

/// `POST /drawer/deposit`
pub async fn deposit(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<CashAmountRequest>,
) -> Result<Json<DrawerMovementView>, ApiError> {
    let movement = pos.drawer().deposit(&actor, req.amount, req.notes).await?;
    Ok(Json(movement.into()))
}

/// `POST /drawer/withdraw`
pub async fn withdraw(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<CashAmountRequest>,
) -> Result<Json<DrawerMovementView>, ApiError> {
    let movement = pos.drawer().withdraw(&actor, req.amount, req.notes).await?;
    Ok(Json(movement.into()))
}

/// `POST /drawer/adjust`
pub async fn adjust(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<CashAmountRequest>,
) -> Result<Json<DrawerMovementView>, ApiError> {
    let movement = pos.drawer().adjust(&actor, req.amount, req.notes).await?;
    Ok(Json(movement.into()))
}

/// `POST /drawer/set-balance`
pub async fn set_balance(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<SetBalanceRequest>,
) -> Result<Json<DrawerMovementView>, ApiError> {
    let movement = pos
        .drawer()
        .set_balance(&actor, req.target, req.notes)
        .await?;
    Ok(Json(movement.into()))
}
