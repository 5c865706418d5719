//! Stock ledger endpoints.
//!
//! Reads expose the live level and the movement history for one product;
//! writes are the three manual mutations (restock, adjust, set). Sale and
//! void movements are written by the transaction engine, never through
//! these endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kasir_core::{Product, StockMovement, StockMovementKind};
use kasir_engine::{Page, Pos};

use crate::auth::Caller;
use crate::error::ApiError;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub product_id: String,
    pub quantity: i64,
    /// Supplier delivery note, purchase order, anything traceable.
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub product_id: String,
    /// Signed correction, must not be zero.
    pub delta: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStockRequest {
    pub product_id: String,
    /// Absolute level counted on the shelf.
    pub target: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

// =============================================================================
// Views
// =============================================================================

/// Live stock level for one product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelView {
    pub product_id: String,
    pub name: String,
    pub track_stock: bool,
    pub stock: i64,
}

impl From<Product> for StockLevelView {
    fn from(product: Product) -> Self {
        StockLevelView {
            product_id: product.id,
            name: product.name,
            track_stock: product.track_stock,
            stock: product.stock,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementView {
    pub id: String,
    pub product_id: String,
    pub kind: StockMovementKind,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub reference: Option<String>,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<StockMovement> for StockMovementView {
    fn from(movement: StockMovement) -> Self {
        StockMovementView {
            id: movement.id,
            product_id: movement.product_id,
            kind: movement.kind,
            quantity: movement.quantity,
            stock_before: movement.stock_before,
            stock_after: movement.stock_after,
            reference: movement.reference,
            actor_id: movement.actor_id,
            created_at: movement.created_at,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /stock/{product_id}`
pub async fn level(
    State(pos): State<Pos>,
    Caller(_actor): Caller,
    Path(product_id): Path<String>,
) -> Result<Json<StockLevelView>, ApiError> {
    let product = pos.stock().level(&product_id).await?;
    Ok(Json(product.into()))
}

/// `GET /stock/{product_id}/movements`
pub async fn movements(
    State(pos): State<Pos>,
    Caller(_actor): Caller,
    Path(product_id): Path<String>,
    Query(params): Query<MovementParams>,
) -> Result<Json<Page<StockMovementView>>, ApiError> {
    let page = pos
        .stock()
        .movements(&product_id, params.page, params.page_size)
        .await?;
    Ok(Json(page.map(StockMovementView::from)))
}

/// `POST /stock/restock`
pub async fn restock(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<RestockRequest>,
) -> Result<Json<StockMovementView>, ApiError> {
    let movement = pos
        .stock()
        .restock(&actor, &req.product_id, req.quantity, req.reference, req.notes)
        .await?;
    Ok(Json(movement.into()))
}

/// `POST /stock/adjust`
pub async fn adjust(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<StockMovementView>, ApiError> {
    let movement = pos
        .stock()
        .adjust(&actor, &req.product_id, req.delta, req.notes)
        .await?;
    Ok(Json(movement.into()))
}

/// `POST /stock/set`
pub async fn set(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<StockMovementView>, ApiError> {
    let movement = pos
        .stock()
        .set_stock(&actor, &req.product_id, req.target, req.notes)
        .await?;
    Ok(Json(movement.into()))
}
