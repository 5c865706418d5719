//! # Stock Service
//!
//! Per-product quantity plus an append-only movement ledger.
//!
//! ## Ledger Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every stock-affecting call appends exactly ONE movement:               │
//! │                                                                         │
//! │    stock_after = stock_before + quantity      (quantity is signed)      │
//! │    products.stock = latest movement's stock_after                       │
//! │                                                                         │
//! │  both written in the same database transaction. Chaining a product's    │
//! │  movements in order therefore reconstructs its current stock.           │
//! │                                                                         │
//! │  Negative deltas floor at zero: the recorded quantity is the delta      │
//! │  actually applied, so the invariant survives the clamp.                 │
//! │                                                                         │
//! │  Products with track_stock = false never enter this ledger: explicit    │
//! │  calls are rejected, the sale path skips them.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use kasir_core::validation::{
    normalize_pagination, validate_non_negative_amount, validate_non_zero_amount, validate_notes,
    validate_positive_amount,
};
use kasir_core::{Actor, Product, StockMovement, StockMovementKind};
use kasir_db::{Database, DbError};

use crate::error::{EngineError, EngineResult};
use crate::{audit, Page};

/// Product stock ledger operations.
#[derive(Debug, Clone)]
pub struct StockService {
    db: Database,
}

impl StockService {
    pub(crate) fn new(db: Database) -> Self {
        StockService { db }
    }

    /// Adds received goods to a product's stock.
    ///
    /// ## Errors
    /// - `Validation` unless `quantity > 0`
    /// - `NotFound` for an unknown product
    /// - `Invalid` when the product does not track stock
    pub async fn restock(
        &self,
        actor: &Actor,
        product_id: &str,
        quantity: i64,
        reference: Option<String>,
        notes: Option<String>,
    ) -> EngineResult<StockMovement> {
        validate_positive_amount("quantity", quantity)?;
        let notes = validate_notes(notes.as_deref())?;

        self.mutate(
            actor,
            product_id,
            StockMovementKind::In,
            "stock.restock",
            reference,
            notes,
            |before| before + quantity,
        )
        .await
    }

    /// Applies a signed correction to a product's stock.
    ///
    /// The resulting stock floors at zero; the recorded movement carries
    /// the delta actually applied.
    ///
    /// ## Errors
    /// - `Validation` when `delta == 0`
    /// - `NotFound` for an unknown product
    /// - `Invalid` when the product does not track stock
    pub async fn adjust(
        &self,
        actor: &Actor,
        product_id: &str,
        delta: i64,
        notes: Option<String>,
    ) -> EngineResult<StockMovement> {
        validate_non_zero_amount("delta", delta)?;
        let notes = validate_notes(notes.as_deref())?;

        self.mutate(
            actor,
            product_id,
            StockMovementKind::Adjust,
            "stock.adjust",
            None,
            notes,
            |before| (before + delta).max(0),
        )
        .await
    }

    /// Sets a product's stock to an absolute count, e.g. after a physical
    /// recount. Records the implied delta.
    ///
    /// ## Errors
    /// - `Validation` on a negative target
    /// - `NotFound` for an unknown product
    /// - `Invalid` when the product does not track stock
    pub async fn set_stock(
        &self,
        actor: &Actor,
        product_id: &str,
        target: i64,
        notes: Option<String>,
    ) -> EngineResult<StockMovement> {
        validate_non_negative_amount("target stock", target)?;
        let notes = validate_notes(notes.as_deref())?;

        self.mutate(
            actor,
            product_id,
            StockMovementKind::Adjust,
            "stock.set",
            None,
            notes,
            |_| target,
        )
        .await
    }

    /// A product's current stock position.
    pub async fn level(&self, product_id: &str) -> EngineResult<Product> {
        self.db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("product", product_id))
    }

    /// A product's movement history, newest first.
    pub async fn movements(
        &self,
        product_id: &str,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> EngineResult<Page<StockMovement>> {
        // Unknown products get a 404, not an empty page.
        self.level(product_id).await?;

        let (page, page_size) = normalize_pagination(page, page_size);
        let stock = self.db.stock();
        let total = stock.count_movements(Some(product_id)).await?;
        let data = stock
            .list_movements(Some(product_id), page_size, (page - 1) * page_size)
            .await?;

        Ok(Page {
            data,
            total,
            page,
            page_size,
        })
    }

    /// Shared mutation path: fetch, compute, guarded update, movement row,
    /// audit row, all in one transaction.
    async fn mutate(
        &self,
        actor: &Actor,
        product_id: &str,
        kind: StockMovementKind,
        action: &str,
        reference: Option<String>,
        notes: Option<String>,
        apply: impl FnOnce(i64) -> i64,
    ) -> EngineResult<StockMovement> {
        let products = self.db.products();
        let stock = self.db.stock();

        let mut tx = self.db.begin().await?;

        let product = products
            .fetch_by_id(&mut *tx, product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("product", product_id))?;
        if !product.track_stock {
            return Err(EngineError::Invalid(format!(
                "product {} does not track stock",
                product_id
            )));
        }

        let now = Utc::now();
        let stock_before = product.stock;
        let stock_after = apply(stock_before);

        let updated = products
            .set_stock_cas(&mut *tx, product_id, stock_before, stock_after, now)
            .await?;
        if updated == 0 {
            return Err(EngineError::Conflict(format!(
                "stock for product {} changed concurrently",
                product_id
            )));
        }

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            kind,
            quantity: stock_after - stock_before,
            stock_before,
            stock_after,
            reference,
            actor_id: actor.actor_id.clone(),
            created_at: now,
        };
        stock.record_movement(&mut *tx, &movement).await?;

        self.db
            .audit()
            .record(
                &mut *tx,
                &audit::entry(
                    actor,
                    action,
                    "product",
                    product_id,
                    json!({
                        "movementId": movement.id,
                        "quantity": movement.quantity,
                        "stockBefore": stock_before,
                        "stockAfter": stock_after,
                        "notes": notes,
                    }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            product_id = %product_id,
            kind = ?kind,
            quantity = movement.quantity,
            stock_after,
            "Stock updated"
        );

        Ok(movement)
    }
}
