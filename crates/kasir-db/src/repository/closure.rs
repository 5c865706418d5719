//! # Daily Closure Repository
//!
//! One reconciliation record per business date. The UNIQUE constraint on
//! `closure_date` is the hard guarantee behind "a date closes once": two
//! racing close calls both pass the application check, and the second
//! INSERT fails here.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kasir_core::DailyClosure;

/// Repository for daily closure operations.
#[derive(Debug, Clone)]
pub struct ClosureRepository {
    pool: SqlitePool,
}

const CLOSURE_COLUMNS: &str = r#"
    id, closure_date, closed_by, closed_at,
    system_cash_total, system_qris_total, system_total_sales, total_transactions,
    physical_cash_count, cash_difference,
    first_transaction_at, last_transaction_at, notes
"#;

impl ClosureRepository {
    /// Creates a new ClosureRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClosureRepository { pool }
    }

    /// Inserts a closure record.
    ///
    /// Fails with a unique violation when the date is already closed.
    pub async fn insert(&self, conn: &mut SqliteConnection, closure: &DailyClosure) -> DbResult<()> {
        debug!(id = %closure.id, date = %closure.closure_date, "Inserting daily closure");

        sqlx::query(
            r#"
            INSERT INTO daily_closures (
                id, closure_date, closed_by, closed_at,
                system_cash_total, system_qris_total, system_total_sales,
                total_transactions, physical_cash_count, cash_difference,
                first_transaction_at, last_transaction_at, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&closure.id)
        .bind(closure.closure_date)
        .bind(&closure.closed_by)
        .bind(closure.closed_at)
        .bind(closure.system_cash_total)
        .bind(closure.system_qris_total)
        .bind(closure.system_total_sales)
        .bind(closure.total_transactions)
        .bind(closure.physical_cash_count)
        .bind(closure.cash_difference)
        .bind(closure.first_transaction_at)
        .bind(closure.last_transaction_at)
        .bind(&closure.notes)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets the closure for a date inside an open transaction.
    pub async fn fetch_by_date(
        &self,
        conn: &mut SqliteConnection,
        date: NaiveDate,
    ) -> DbResult<Option<DailyClosure>> {
        let closure = sqlx::query_as::<_, DailyClosure>(&format!(
            "SELECT {CLOSURE_COLUMNS} FROM daily_closures WHERE closure_date = ?1"
        ))
        .bind(date)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(closure)
    }

    /// Gets a closure by ID inside an open transaction.
    pub async fn fetch_by_id(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<DailyClosure>> {
        let closure = sqlx::query_as::<_, DailyClosure>(&format!(
            "SELECT {CLOSURE_COLUMNS} FROM daily_closures WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(closure)
    }

    /// Deletes a closure record (reopen-day).
    ///
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting daily closure");

        let result = sqlx::query("DELETE FROM daily_closures WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Gets the closure for a date.
    pub async fn get_by_date(&self, date: NaiveDate) -> DbResult<Option<DailyClosure>> {
        let closure = sqlx::query_as::<_, DailyClosure>(&format!(
            "SELECT {CLOSURE_COLUMNS} FROM daily_closures WHERE closure_date = ?1"
        ))
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(closure)
    }
}
