//! # Cashier Session Repository
//!
//! Shift lifecycle storage: open, aggregate, reconcile, close.
//!
//! ## One Open Shift Per Cashier
//! The application checks for an existing open session before inserting, but
//! the real guarantee is `idx_sessions_one_open_per_cashier`, a partial
//! unique index on `cashier_id WHERE status = 'open'`. When two open calls
//! race, the loser's INSERT fails with a unique violation instead of leaving
//! two open shifts behind.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{CashierSession, SessionStatus, SessionTotals};

/// Filter for session listing queries. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub cashier_id: Option<String>,
    /// Sessions whose start_time falls in `[start_from, start_before)`.
    pub start_from: Option<DateTime<Utc>>,
    pub start_before: Option<DateTime<Utc>>,
}

/// Repository for cashier session operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

const SESSION_COLUMNS: &str = r#"
    id, cashier_id, start_time, end_time,
    opening_cash, closing_cash, expected_cash, difference,
    total_sales, cash_total, non_cash_total, transaction_count,
    status, notes
"#;

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Inserts a freshly opened session.
    ///
    /// Fails with a unique violation when the cashier already has an open
    /// session (partial unique index).
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        session: &CashierSession,
    ) -> DbResult<()> {
        debug!(id = %session.id, cashier_id = %session.cashier_id, "Inserting session");

        sqlx::query(
            r#"
            INSERT INTO cashier_sessions (
                id, cashier_id, start_time, end_time,
                opening_cash, closing_cash, expected_cash, difference,
                total_sales, cash_total, non_cash_total, transaction_count,
                status, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&session.id)
        .bind(&session.cashier_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.opening_cash)
        .bind(session.closing_cash)
        .bind(session.expected_cash)
        .bind(session.difference)
        .bind(session.total_sales)
        .bind(session.cash_total)
        .bind(session.non_cash_total)
        .bind(session.transaction_count)
        .bind(session.status)
        .bind(&session.notes)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets the cashier's open session, if any, inside an open transaction.
    pub async fn fetch_open_for_cashier(
        &self,
        conn: &mut SqliteConnection,
        cashier_id: &str,
    ) -> DbResult<Option<CashierSession>> {
        let session = sqlx::query_as::<_, CashierSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cashier_sessions \
             WHERE cashier_id = ?1 AND status = 'open'"
        ))
        .bind(cashier_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(session)
    }

    /// Sums a session's completed transactions into live totals.
    ///
    /// Voided transactions are excluded, so voiding before shift end
    /// naturally pulls the totals back down.
    pub async fn compute_totals(
        &self,
        conn: &mut SqliteConnection,
        session_id: &str,
    ) -> DbResult<SessionTotals> {
        let totals = sqlx::query_as::<_, SessionTotals>(
            r#"
            SELECT
                COALESCE(SUM(total), 0)                                          AS total_sales,
                COALESCE(SUM(CASE WHEN payment_method = 'cash' THEN total END), 0) AS cash_total,
                COALESCE(SUM(CASE WHEN payment_method <> 'cash' THEN total END), 0) AS non_cash_total,
                COUNT(*)                                                         AS transaction_count
            FROM transactions
            WHERE session_id = ?1 AND status = 'completed'
            "#,
        )
        .bind(session_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(totals)
    }

    /// Persists a closed session's final state.
    ///
    /// Guarded on `status = 'open'`: returns 0 rows when the session was
    /// closed by a concurrent call, so double-close cannot overwrite the
    /// frozen figures.
    pub async fn close(
        &self,
        conn: &mut SqliteConnection,
        session: &CashierSession,
    ) -> DbResult<u64> {
        debug!(id = %session.id, "Closing session");

        let result = sqlx::query(
            r#"
            UPDATE cashier_sessions SET
                end_time = ?2,
                closing_cash = ?3,
                expected_cash = ?4,
                difference = ?5,
                total_sales = ?6,
                cash_total = ?7,
                non_cash_total = ?8,
                transaction_count = ?9,
                status = 'closed',
                notes = ?10
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(&session.id)
        .bind(session.end_time)
        .bind(session.closing_cash)
        .bind(session.expected_cash)
        .bind(session.difference)
        .bind(session.total_sales)
        .bind(session.cash_total)
        .bind(session.non_cash_total)
        .bind(session.transaction_count)
        .bind(&session.notes)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Open sessions whose start_time falls in `[start, end)`.
    ///
    /// The daily closure refuses to close a date while this is non-empty,
    /// and reports the cashiers still on shift.
    pub async fn fetch_open_in_window(
        &self,
        conn: &mut SqliteConnection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<CashierSession>> {
        let sessions = sqlx::query_as::<_, CashierSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM cashier_sessions
            WHERE status = 'open' AND start_time >= ?1 AND start_time < ?2
            ORDER BY start_time ASC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;

        Ok(sessions)
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashierSession>> {
        let session = sqlx::query_as::<_, CashierSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cashier_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Lists sessions matching the filter, newest first.
    pub async fn list(
        &self,
        filter: &SessionFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<CashierSession>> {
        let sessions = sqlx::query_as::<_, CashierSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM cashier_sessions
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR cashier_id = ?2)
              AND (?3 IS NULL OR start_time >= ?3)
              AND (?4 IS NULL OR start_time < ?4)
            ORDER BY start_time DESC
            LIMIT ?5 OFFSET ?6
            "#
        ))
        .bind(filter.status)
        .bind(&filter.cashier_id)
        .bind(filter.start_from)
        .bind(filter.start_before)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Counts sessions matching the filter.
    pub async fn count(&self, filter: &SessionFilter) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM cashier_sessions
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR cashier_id = ?2)
              AND (?3 IS NULL OR start_time >= ?3)
              AND (?4 IS NULL OR start_time < ?4)
            "#,
        )
        .bind(filter.status)
        .bind(&filter.cashier_id)
        .bind(filter.start_from)
        .bind(filter.start_before)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
