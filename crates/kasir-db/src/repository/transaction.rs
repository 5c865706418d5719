//! # Transaction Repository
//!
//! Sales, their line items, and the per-date invoice counters.
//!
//! ## Invoice Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invoice_counters                                                       │
//! │                                                                         │
//! │  business_date   next_seq                                               │
//! │  ─────────────   ────────                                               │
//! │  2025-08-22          214                                                │
//! │  2025-08-23            7      ← seven invoices issued today             │
//! │                                                                         │
//! │  next_invoice_seq() claims a number with a single atomic upsert:        │
//! │                                                                         │
//! │    INSERT ... VALUES (date, 1)                                          │
//! │    ON CONFLICT(business_date) DO UPDATE SET next_seq = next_seq + 1     │
//! │    RETURNING next_seq                                                   │
//! │                                                                         │
//! │  Two racing sales each get their own value; there is no read-then-      │
//! │  write gap to collide in. Voiding a sale does not return its number,    │
//! │  so the sequence may show gaps.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{DaySalesSummary, Transaction, TransactionItem, TransactionStatus};

/// Filter for transaction listing queries. `None` fields match everything.
///
/// `date_from`/`date_to` bound the business date inclusively.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub session_id: Option<String>,
    pub cashier_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<TransactionStatus>,
}

/// Repository for sale transaction operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

const TRANSACTION_COLUMNS: &str = r#"
    id, invoice_no, cashier_id, session_id, business_date,
    subtotal, discount_amount, tax, total,
    payment_method, paid_amount, change_amount,
    status, void_reason, voided_by, voided_at,
    notes, created_at
"#;

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Claims the next invoice sequence number for a business date.
    ///
    /// Atomic upsert on the dedicated counter row; never derived from
    /// MAX(invoice_no), so concurrent sales cannot claim the same number.
    pub async fn next_invoice_seq(
        &self,
        conn: &mut SqliteConnection,
        business_date: NaiveDate,
    ) -> DbResult<i64> {
        let seq = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO invoice_counters (business_date, next_seq)
            VALUES (?1, 1)
            ON CONFLICT(business_date) DO UPDATE SET next_seq = next_seq + 1
            RETURNING next_seq
            "#,
        )
        .bind(business_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(seq)
    }

    /// Inserts a completed transaction.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> DbResult<()> {
        debug!(id = %transaction.id, invoice_no = %transaction.invoice_no, "Inserting transaction");

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, invoice_no, cashier_id, session_id, business_date,
                subtotal, discount_amount, tax, total,
                payment_method, paid_amount, change_amount,
                status, void_reason, voided_by, voided_at,
                notes, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15, ?16,
                ?17, ?18
            )
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.invoice_no)
        .bind(&transaction.cashier_id)
        .bind(&transaction.session_id)
        .bind(transaction.business_date)
        .bind(transaction.subtotal)
        .bind(transaction.discount_amount)
        .bind(transaction.tax)
        .bind(transaction.total)
        .bind(transaction.payment_method)
        .bind(transaction.paid_amount)
        .bind(transaction.change_amount)
        .bind(transaction.status)
        .bind(&transaction.void_reason)
        .bind(&transaction.voided_by)
        .bind(transaction.voided_at)
        .bind(&transaction.notes)
        .bind(transaction.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts one line item.
    ///
    /// ## Snapshot Pattern
    /// Product name and unit price are copied onto the item so the sale
    /// record stays truthful when the catalog changes later.
    pub async fn insert_item(
        &self,
        conn: &mut SqliteConnection,
        item: &TransactionItem,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO transaction_items (
                id, transaction_id, product_id,
                name_snapshot, unit_price, quantity, line_total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.transaction_id)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.line_total)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a transaction by ID inside an open transaction.
    pub async fn fetch_by_id(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(transaction)
    }

    /// Gets a transaction's items inside an open transaction.
    pub async fn fetch_items(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id,
                   name_snapshot, unit_price, quantity, line_total
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Marks a completed transaction as voided.
    ///
    /// Guarded on `status = 'completed'`: a second void affects zero rows,
    /// so the caller can report the conflict instead of double-restoring
    /// stock. Returns the number of rows updated (0 or 1).
    pub async fn mark_voided(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        reason: &str,
        voided_by: &str,
        voided_at: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, voided_by = %voided_by, "Voiding transaction");

        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                status = 'voided',
                void_reason = ?2,
                voided_by = ?3,
                voided_at = ?4
            WHERE id = ?1 AND status = 'completed'
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(voided_by)
        .bind(voided_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Sums one business date's completed sales for the daily closure.
    pub async fn summarize_date(
        &self,
        conn: &mut SqliteConnection,
        business_date: NaiveDate,
    ) -> DbResult<DaySalesSummary> {
        let summary = sqlx::query_as::<_, DaySalesSummary>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN payment_method = 'cash' THEN total END), 0) AS cash_total,
                COALESCE(SUM(CASE WHEN payment_method = 'qris' THEN total END), 0) AS qris_total,
                COALESCE(SUM(total), 0)                                            AS total_sales,
                COUNT(*)                                                           AS transaction_count,
                MIN(created_at)                                                    AS first_transaction_at,
                MAX(created_at)                                                    AS last_transaction_at
            FROM transactions
            WHERE business_date = ?1 AND status = 'completed'
            "#,
        )
        .bind(business_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(summary)
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Gets all items for a transaction.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id,
                   name_snapshot, unit_price, quantity, line_total
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists transactions matching the filter, newest first.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM transactions
            WHERE (?1 IS NULL OR session_id = ?1)
              AND (?2 IS NULL OR cashier_id = ?2)
              AND (?3 IS NULL OR business_date >= ?3)
              AND (?4 IS NULL OR business_date <= ?4)
              AND (?5 IS NULL OR status = ?5)
            ORDER BY created_at DESC
            LIMIT ?6 OFFSET ?7
            "#
        ))
        .bind(&filter.session_id)
        .bind(&filter.cashier_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Counts transactions matching the filter.
    pub async fn count(&self, filter: &TransactionFilter) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE (?1 IS NULL OR session_id = ?1)
              AND (?2 IS NULL OR cashier_id = ?2)
              AND (?3 IS NULL OR business_date >= ?3)
              AND (?4 IS NULL OR business_date <= ?4)
              AND (?5 IS NULL OR status = ?5)
            "#,
        )
        .bind(&filter.session_id)
        .bind(&filter.cashier_id)
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
