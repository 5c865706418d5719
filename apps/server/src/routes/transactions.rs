//! Sale (transaction) endpoints.
//!
//! Creating a sale requires an open shift; the caller never supplies a
//! price, only product ids and quantities. Voiding is admin only and is
//! enforced in the engine.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kasir_core::{DiscountKind, PaymentMethod, Transaction, TransactionItem, TransactionStatus};
use kasir_engine::{
    NewTransaction, NewTransactionItem, Page, Pos, TransactionQuery, TransactionWithItems,
};

use crate::auth::Caller;
use crate::error::ApiError;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub items: Vec<ItemRequest>,
    #[serde(default)]
    pub discount_kind: DiscountKind,
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default)]
    pub tax: i64,
    pub payment_method: PaymentMethod,
    pub paid_amount: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl From<CreateTransactionRequest> for NewTransaction {
    fn from(req: CreateTransactionRequest) -> Self {
        NewTransaction {
            items: req
                .items
                .into_iter()
                .map(|item| NewTransactionItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            discount_kind: req.discount_kind,
            discount_value: req.discount_value,
            tax: req.tax,
            payment_method: req.payment_method,
            paid_amount: req.paid_amount,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoidRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListParams {
    pub session_id: Option<String>,
    pub cashier_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<TransactionStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl From<TransactionListParams> for TransactionQuery {
    fn from(params: TransactionListParams) -> Self {
        TransactionQuery {
            session_id: params.session_id,
            cashier_id: params.cashier_id,
            date_from: params.date_from,
            date_to: params.date_to,
            status: params.status,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    pub invoice_no: String,
    pub cashier_id: String,
    pub session_id: String,
    pub business_date: NaiveDate,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub tax: i64,
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub paid_amount: i64,
    pub change_amount: i64,
    pub status: TransactionStatus,
    pub void_reason: Option<String>,
    pub voided_by: Option<String>,
    pub voided_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionView {
    fn from(t: Transaction) -> Self {
        TransactionView {
            id: t.id,
            invoice_no: t.invoice_no,
            cashier_id: t.cashier_id,
            session_id: t.session_id,
            business_date: t.business_date,
            subtotal: t.subtotal,
            discount_amount: t.discount_amount,
            tax: t.tax,
            total: t.total,
            payment_method: t.payment_method,
            paid_amount: t.paid_amount,
            change_amount: t.change_amount,
            status: t.status,
            void_reason: t.void_reason,
            voided_by: t.voided_by,
            voided_at: t.voided_at,
            notes: t.notes,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItemView {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

impl From<TransactionItem> for TransactionItemView {
    fn from(item: TransactionItem) -> Self {
        TransactionItemView {
            id: item.id,
            product_id: item.product_id,
            name: item.name_snapshot,
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total: item.line_total,
        }
    }
}

/// A transaction with its line items, as returned from create and detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub transaction: TransactionView,
    pub items: Vec<TransactionItemView>,
}

impl From<TransactionWithItems> for ReceiptView {
    fn from(receipt: TransactionWithItems) -> Self {
        ReceiptView {
            transaction: receipt.transaction.into(),
            items: receipt.items.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /transactions`
pub async fn create(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ReceiptView>), ApiError> {
    let receipt = pos.transactions().create(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// `POST /transactions/{id}/void`
pub async fn void(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Path(id): Path<String>,
    Json(req): Json<VoidRequest>,
) -> Result<Json<TransactionView>, ApiError> {
    let transaction = pos.transactions().void(&actor, &id, &req.reason).await?;
    Ok(Json(transaction.into()))
}

/// `GET /transactions/{id}`
pub async fn show(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Path(id): Path<String>,
) -> Result<Json<ReceiptView>, ApiError> {
    let receipt = pos.transactions().get(&actor, &id).await?;
    Ok(Json(receipt.into()))
}

/// `GET /transactions`
pub async fn list(
    State(pos): State<Pos>,
    Caller(actor): Caller,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<Page<TransactionView>>, ApiError> {
    let page = pos.transactions().list(&actor, &params.into()).await?;
    Ok(Json(page.map(TransactionView::from)))
}
