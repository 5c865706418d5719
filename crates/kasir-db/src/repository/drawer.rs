//! # Cash Drawer Repository
//!
//! The store-wide cash position: one singleton balance row plus an
//! append-only movement ledger.
//!
//! ## Balance Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cash_drawer_balance holds exactly one row (id = 1), created lazily     │
//! │  at zero the first time anything touches the drawer.                    │
//! │                                                                         │
//! │  A balance change is three steps in ONE database transaction:           │
//! │                                                                         │
//! │    1. fetch_balance(tx)            → before                             │
//! │    2. set_balance_cas(tx, before, after)  → fails if before moved       │
//! │    3. record_movement(tx, ...)     → ledger row with before/after       │
//! │                                                                         │
//! │  The compare-and-set in step 2 means a stale read can never silently    │
//! │  overwrite a concurrent withdrawal: the UPDATE matches zero rows and    │
//! │  the whole operation rolls back.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{CashDrawerBalance, CashDrawerMovement, DrawerMovementKind};

/// Repository for cash drawer operations.
#[derive(Debug, Clone)]
pub struct DrawerRepository {
    pool: SqlitePool,
}

impl DrawerRepository {
    /// Creates a new DrawerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DrawerRepository { pool }
    }

    /// Gets the singleton balance inside an open transaction, creating it at
    /// zero if this is the first touch.
    pub async fn fetch_balance(
        &self,
        conn: &mut SqliteConnection,
        now: DateTime<Utc>,
    ) -> DbResult<CashDrawerBalance> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO cash_drawer_balance (id, current_balance, last_updated)
            VALUES (1, 0, ?1)
            "#,
        )
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let balance = sqlx::query_as::<_, CashDrawerBalance>(
            "SELECT id, current_balance, last_updated FROM cash_drawer_balance WHERE id = 1",
        )
        .fetch_one(&mut *conn)
        .await?;

        Ok(balance)
    }

    /// Compare-and-set balance update.
    ///
    /// Only succeeds while the balance still holds `expected_balance`.
    /// Returns the number of rows updated (0 or 1).
    pub async fn set_balance_cas(
        &self,
        conn: &mut SqliteConnection,
        expected_balance: i64,
        new_balance: i64,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE cash_drawer_balance
            SET current_balance = ?2, last_updated = ?3
            WHERE id = 1 AND current_balance = ?1
            "#,
        )
        .bind(expected_balance)
        .bind(new_balance)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Appends a movement to the drawer ledger.
    ///
    /// Always called in the same transaction as the matching balance update.
    pub async fn record_movement(
        &self,
        conn: &mut SqliteConnection,
        movement: &CashDrawerMovement,
    ) -> DbResult<()> {
        debug!(
            kind = ?movement.kind,
            amount = movement.amount,
            balance_after = movement.balance_after,
            "Recording drawer movement"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_drawer_movements (
                id, kind, amount, balance_before, balance_after,
                reference, notes, actor_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&movement.id)
        .bind(movement.kind)
        .bind(movement.amount)
        .bind(movement.balance_before)
        .bind(movement.balance_after)
        .bind(&movement.reference)
        .bind(&movement.notes)
        .bind(&movement.actor_id)
        .bind(movement.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Finds ledger movements of one kind carrying a given reference,
    /// inside an open transaction.
    ///
    /// Reopen-day uses this to locate the SalesIn a closure posted.
    pub async fn fetch_by_kind_and_reference(
        &self,
        conn: &mut SqliteConnection,
        kind: DrawerMovementKind,
        reference: &str,
    ) -> DbResult<Vec<CashDrawerMovement>> {
        let movements = sqlx::query_as::<_, CashDrawerMovement>(
            r#"
            SELECT id, kind, amount, balance_before, balance_after,
                   reference, notes, actor_id, created_at
            FROM cash_drawer_movements
            WHERE kind = ?1 AND reference = ?2
            ORDER BY created_at
            "#,
        )
        .bind(kind)
        .bind(reference)
        .fetch_all(&mut *conn)
        .await?;

        Ok(movements)
    }

    /// Gets the singleton balance, if it exists yet.
    ///
    /// Read paths treat a missing row as a zero balance rather than
    /// creating one.
    pub async fn get_balance(&self) -> DbResult<Option<CashDrawerBalance>> {
        let balance = sqlx::query_as::<_, CashDrawerBalance>(
            "SELECT id, current_balance, last_updated FROM cash_drawer_balance WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Movements whose timestamp falls in `[start, end)`, oldest first.
    ///
    /// The drawer summary folds one business day's worth of these.
    pub async fn list_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<CashDrawerMovement>> {
        let movements = sqlx::query_as::<_, CashDrawerMovement>(
            r#"
            SELECT id, kind, amount, balance_before, balance_after,
                   reference, notes, actor_id, created_at
            FROM cash_drawer_movements
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists drawer movements, newest first, optionally by kind.
    pub async fn list_movements(
        &self,
        kind: Option<DrawerMovementKind>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<CashDrawerMovement>> {
        let movements = sqlx::query_as::<_, CashDrawerMovement>(
            r#"
            SELECT id, kind, amount, balance_before, balance_after,
                   reference, notes, actor_id, created_at
            FROM cash_drawer_movements
            WHERE (?1 IS NULL OR kind = ?1)
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Counts drawer movements, optionally by kind.
    pub async fn count_movements(&self, kind: Option<DrawerMovementKind>) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cash_drawer_movements WHERE (?1 IS NULL OR kind = ?1)",
        )
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
