//! # Stock Movement Repository
//!
//! The append-only stock ledger. Every change to a product's stock column is
//! paired with one row here, written in the same database transaction.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock_movements (append-only)                                          │
//! │                                                                         │
//! │  kind      quantity   before   after   reference                       │
//! │  ───────   ────────   ──────   ─────   ──────────────                  │
//! │  in          +24        6        30    PO-2025-081 (restock)           │
//! │  out          -2       30        28    INV-20250823-0001 (sale)        │
//! │  in           +2       28        30    VOID-INV-20250823-0001          │
//! │  adjust       -5       30        25    stock opname                    │
//! │                                                                         │
//! │  Invariant: after = before + quantity, and the latest `after` equals   │
//! │  products.stock.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kasir_core::StockMovement;

/// Repository for stock movement operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Appends a movement to the ledger.
    ///
    /// Always called in the same transaction as the matching
    /// `products.stock` update.
    pub async fn record_movement(
        &self,
        conn: &mut SqliteConnection,
        movement: &StockMovement,
    ) -> DbResult<()> {
        debug!(
            product_id = %movement.product_id,
            quantity = movement.quantity,
            stock_after = movement.stock_after,
            "Recording stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, kind, quantity, stock_before, stock_after,
                reference, actor_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(movement.stock_before)
        .bind(movement.stock_after)
        .bind(&movement.reference)
        .bind(&movement.actor_id)
        .bind(movement.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Lists movements, newest first, optionally for one product.
    pub async fn list_movements(
        &self,
        product_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, kind, quantity, stock_before, stock_after,
                   reference, actor_id, created_at
            FROM stock_movements
            WHERE (?1 IS NULL OR product_id = ?1)
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Counts movements, optionally for one product.
    pub async fn count_movements(&self, product_id: Option<&str>) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_movements WHERE (?1 IS NULL OR product_id = ?1)",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Lists movements carrying a given reference (e.g. an invoice number or
    /// `VOID-{invoice_no}`), oldest first.
    pub async fn list_by_reference(&self, reference: &str) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, kind, quantity, stock_before, stock_after,
                   reference, actor_id, created_at
            FROM stock_movements
            WHERE reference = ?1
            ORDER BY created_at
            "#,
        )
        .bind(reference)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
