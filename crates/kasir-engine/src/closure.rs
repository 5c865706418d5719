//! # Closure Service
//!
//! End-of-day reconciliation: freeze a business date's totals against a
//! physically counted drawer, reversibly.
//!
//! ## Close / Reopen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  close_day(date, physical_cash)                 [admin]                 │
//! │                                                                         │
//! │    preconditions:  no closure row for date      → Conflict              │
//! │                    no open shift started that   → Conflict, naming      │
//! │                    business date                  the cashiers          │
//! │                                                                         │
//! │    totals: SUM over completed sales with business_date = date           │
//! │    cash_difference = physical_cash − system_cash_total                  │
//! │                                                                         │
//! │    when system_cash_total > 0, the day's cash enters the drawer:        │
//! │      CashDrawerMovement(SalesIn, +system_cash_total, ref = closure.id)  │
//! │                                                                         │
//! │  reopen_day(closure_id)                         [admin]                 │
//! │                                                                         │
//! │    deletes the closure row; if it posted a SalesIn, appends the         │
//! │    compensating entry:                                                  │
//! │      CashDrawerMovement(Adjustment, −amount, ref = closure.id)          │
//! │    The original SalesIn stays in the ledger; reversal is a new entry,   │
//! │    never an erasure.                                                    │
//! │                                                                         │
//! │  Each operation is ONE database transaction: the closure row and its    │
//! │  drawer effect exist together or not at all.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use kasir_core::time::{business_day_bounds, format_business_date};
use kasir_core::validation::{validate_non_negative_amount, validate_notes};
use kasir_core::{
    Actor, CashDrawerMovement, CashierSession, DailyClosure, DaySalesSummary, DrawerMovementKind,
};
use kasir_db::{Database, DbError};

use crate::error::{EngineError, EngineResult};
use crate::{audit, require_admin, StoreSettings};

/// Read-only projection of one business date: live totals, the persisted
/// closure if any, and the open shifts currently blocking a close.
#[derive(Debug, Clone, Serialize)]
pub struct DayStatus {
    pub date: NaiveDate,
    pub is_closed: bool,
    pub closure: Option<DailyClosure>,
    /// Totals summed at call time; may still move while shifts are open.
    pub live: DaySalesSummary,
    pub open_sessions: Vec<CashierSession>,
}

/// Daily closure operations. All admin only.
#[derive(Debug, Clone)]
pub struct ClosureService {
    db: Database,
    settings: StoreSettings,
}

impl ClosureService {
    pub(crate) fn new(db: Database, settings: StoreSettings) -> Self {
        ClosureService { db, settings }
    }

    /// Closes a business date against a physically counted cash figure.
    ///
    /// ## Errors
    /// - `Forbidden` for non-admin callers
    /// - `Conflict` when the date is already closed
    /// - `Conflict` naming the cashiers whose shifts are still open
    pub async fn close_day(
        &self,
        actor: &Actor,
        date: NaiveDate,
        physical_cash: i64,
        notes: Option<String>,
    ) -> EngineResult<DailyClosure> {
        require_admin(actor, "close day")?;
        validate_non_negative_amount("physical cash count", physical_cash)?;
        let notes = validate_notes(notes.as_deref())?;

        let closures = self.db.closures();
        let sessions = self.db.sessions();
        let transactions = self.db.transactions();
        let drawer = self.db.drawer();

        let mut tx = self.db.begin().await?;

        if closures.fetch_by_date(&mut *tx, date).await?.is_some() {
            return Err(EngineError::Conflict(format!(
                "business date {} is already closed",
                format_business_date(date)
            )));
        }

        let (start, end) = business_day_bounds(date, self.settings.store_offset);
        let open = sessions.fetch_open_in_window(&mut *tx, start, end).await?;
        if !open.is_empty() {
            let cashiers: Vec<&str> = open.iter().map(|s| s.cashier_id.as_str()).collect();
            return Err(EngineError::Conflict(format!(
                "all shifts must be closed first: still open for {}",
                cashiers.join(", ")
            )));
        }

        let summary = transactions.summarize_date(&mut *tx, date).await?;
        let now = Utc::now();

        let closure = DailyClosure {
            id: Uuid::new_v4().to_string(),
            closure_date: date,
            closed_by: actor.actor_id.clone(),
            closed_at: now,
            system_cash_total: summary.cash_total,
            system_qris_total: summary.qris_total,
            system_total_sales: summary.total_sales,
            total_transactions: summary.transaction_count,
            physical_cash_count: physical_cash,
            cash_difference: physical_cash - summary.cash_total,
            first_transaction_at: summary.first_transaction_at,
            last_transaction_at: summary.last_transaction_at,
            notes,
        };

        // The UNIQUE(closure_date) index backs this up against a racing close.
        match closures.insert(&mut *tx, &closure).await {
            Err(e) if e.is_unique_violation() => {
                return Err(EngineError::Conflict(format!(
                    "business date {} is already closed",
                    format_business_date(date)
                )));
            }
            other => other?,
        }

        // A zero-cash day (QRIS only, or no sales) posts nothing.
        if summary.cash_total > 0 {
            let balance = drawer.fetch_balance(&mut *tx, now).await?;
            let balance_before = balance.current_balance;
            let balance_after = balance_before + summary.cash_total;

            let updated = drawer
                .set_balance_cas(&mut *tx, balance_before, balance_after, now)
                .await?;
            if updated == 0 {
                return Err(EngineError::Conflict(
                    "drawer balance changed concurrently".to_string(),
                ));
            }

            drawer
                .record_movement(
                    &mut *tx,
                    &CashDrawerMovement {
                        id: Uuid::new_v4().to_string(),
                        kind: DrawerMovementKind::SalesIn,
                        amount: summary.cash_total,
                        balance_before,
                        balance_after,
                        reference: Some(closure.id.clone()),
                        notes: Some(format!("cash sales {}", format_business_date(date))),
                        actor_id: actor.actor_id.clone(),
                        created_at: now,
                    },
                )
                .await?;
        }

        self.db
            .audit()
            .record(
                &mut *tx,
                &audit::entry(
                    actor,
                    "closure.close_day",
                    "daily_closure",
                    &closure.id,
                    json!({
                        "date": format_business_date(date),
                        "systemCashTotal": summary.cash_total,
                        "physicalCashCount": physical_cash,
                        "cashDifference": closure.cash_difference,
                        "totalTransactions": summary.transaction_count,
                    }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            closure_id = %closure.id,
            date = %format_business_date(date),
            system_cash_total = summary.cash_total,
            cash_difference = closure.cash_difference,
            "Business date closed"
        );

        Ok(closure)
    }

    /// Reopens a closed business date, reversing its drawer effect.
    ///
    /// Returns the removed closure record.
    ///
    /// ## Errors
    /// - `Forbidden` for non-admin callers
    /// - `NotFound` for an unknown closure ID
    pub async fn reopen_day(&self, actor: &Actor, closure_id: &str) -> EngineResult<DailyClosure> {
        require_admin(actor, "reopen day")?;

        let closures = self.db.closures();
        let drawer = self.db.drawer();

        let mut tx = self.db.begin().await?;

        let closure = closures
            .fetch_by_id(&mut *tx, closure_id)
            .await?
            .ok_or_else(|| EngineError::not_found("closure", closure_id))?;

        let deleted = closures.delete(&mut *tx, closure_id).await?;
        if deleted == 0 {
            return Err(EngineError::not_found("closure", closure_id));
        }

        // Reverse the SalesIn this closure posted, if it posted one.
        let posted: i64 = drawer
            .fetch_by_kind_and_reference(&mut *tx, DrawerMovementKind::SalesIn, closure_id)
            .await?
            .iter()
            .map(|m| m.amount)
            .sum();

        let now = Utc::now();
        if posted != 0 {
            let balance = drawer.fetch_balance(&mut *tx, now).await?;
            let balance_before = balance.current_balance;
            let balance_after = balance_before - posted;

            let updated = drawer
                .set_balance_cas(&mut *tx, balance_before, balance_after, now)
                .await?;
            if updated == 0 {
                return Err(EngineError::Conflict(
                    "drawer balance changed concurrently".to_string(),
                ));
            }

            drawer
                .record_movement(
                    &mut *tx,
                    &CashDrawerMovement {
                        id: Uuid::new_v4().to_string(),
                        kind: DrawerMovementKind::Adjustment,
                        amount: -posted,
                        balance_before,
                        balance_after,
                        reference: Some(closure_id.to_string()),
                        notes: Some(format!(
                            "reopen {}",
                            format_business_date(closure.closure_date)
                        )),
                        actor_id: actor.actor_id.clone(),
                        created_at: now,
                    },
                )
                .await?;
        }

        self.db
            .audit()
            .record(
                &mut *tx,
                &audit::entry(
                    actor,
                    "closure.reopen_day",
                    "daily_closure",
                    closure_id,
                    json!({
                        "date": format_business_date(closure.closure_date),
                        "reversedAmount": posted,
                    }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            closure_id = %closure_id,
            date = %format_business_date(closure.closure_date),
            reversed_amount = posted,
            "Business date reopened"
        );

        Ok(closure)
    }

    /// One business date's reconciliation picture. Admin only.
    pub async fn status(&self, actor: &Actor, date: NaiveDate) -> EngineResult<DayStatus> {
        require_admin(actor, "closure status")?;

        let mut conn = self.db.acquire().await?;

        let closure = self.db.closures().get_by_date(date).await?;
        let live = self
            .db
            .transactions()
            .summarize_date(&mut *conn, date)
            .await?;

        let (start, end) = business_day_bounds(date, self.settings.store_offset);
        let open_sessions = self
            .db
            .sessions()
            .fetch_open_in_window(&mut *conn, start, end)
            .await?;

        Ok(DayStatus {
            date,
            is_closed: closure.is_some(),
            closure,
            live,
            open_sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use crate::Pos;
    use kasir_core::time::business_date_of;
    use kasir_core::PaymentMethod;

    fn today(pos: &Pos) -> NaiveDate {
        business_date_of(Utc::now(), pos.settings().store_offset)
    }

    /// Open a shift, ring up one cash sale, close the shift.
    async fn finished_cash_day(pos: &Pos, price: i64) -> NaiveDate {
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(pos, "Kopi", price, 50).await;

        pos.sessions().start_session(&cashier, 0).await.unwrap();
        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();
        pos.sessions()
            .end_session(&cashier, price, None)
            .await
            .unwrap();

        sale.transaction.business_date
    }

    async fn sales_in_for(pos: &Pos, closure_id: &str) -> Vec<kasir_core::CashDrawerMovement> {
        let mut conn = pos.database().acquire().await.unwrap();
        pos.database()
            .drawer()
            .fetch_by_kind_and_reference(&mut *conn, DrawerMovementKind::SalesIn, closure_id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_close_day_posts_cash_sales_into_the_drawer() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let date = finished_cash_day(&pos, 50_000).await;

        let closure = pos
            .closures()
            .close_day(&admin, date, 50_000, None)
            .await
            .unwrap();

        assert_eq!(closure.closure_date, date);
        assert_eq!(closure.system_cash_total, 50_000);
        assert_eq!(closure.system_total_sales, 50_000);
        assert_eq!(closure.total_transactions, 1);
        assert_eq!(closure.physical_cash_count, 50_000);
        assert_eq!(closure.cash_difference, 0);
        assert!(closure.first_transaction_at.is_some());

        let posted = sales_in_for(&pos, &closure.id).await;
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].amount, 50_000);

        let summary = pos.drawer().summary().await.unwrap();
        assert_eq!(summary.current_balance, 50_000);
    }

    #[tokio::test]
    async fn test_close_day_records_a_shortfall() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let date = finished_cash_day(&pos, 50_000).await;

        let closure = pos
            .closures()
            .close_day(&admin, date, 43_000, Some("till short".to_string()))
            .await
            .unwrap();

        assert_eq!(closure.cash_difference, -7_000);
        assert_eq!(closure.notes.as_deref(), Some("till short"));
    }

    #[tokio::test]
    async fn test_close_day_twice_conflicts() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let date = finished_cash_day(&pos, 10_000).await;

        pos.closures()
            .close_day(&admin, date, 10_000, None)
            .await
            .unwrap();
        let err = pos
            .closures()
            .close_day(&admin, date, 10_000, None)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Conflict(ref m) if m.contains("already closed")));
    }

    #[tokio::test]
    async fn test_close_day_names_blocking_cashiers() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.sessions()
            .start_session(&testutil::cashier("c7"), 0)
            .await
            .unwrap();
        let err = pos
            .closures()
            .close_day(&admin, today(&pos), 0, None)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Conflict(ref m) if m.contains("c7")));
    }

    #[tokio::test]
    async fn test_zero_cash_day_posts_nothing() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        let closure = pos
            .closures()
            .close_day(&admin, today(&pos), 0, None)
            .await
            .unwrap();

        assert_eq!(closure.system_cash_total, 0);
        assert_eq!(closure.total_transactions, 0);
        assert!(closure.first_transaction_at.is_none());
        assert!(sales_in_for(&pos, &closure.id).await.is_empty());

        // Reopening it writes no compensation either.
        pos.closures().reopen_day(&admin, &closure.id).await.unwrap();
        let page = pos.drawer().movements(None, None, None).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_qris_only_day_posts_nothing() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Kopi", 30_000, 10).await;

        pos.sessions().start_session(&cashier, 0).await.unwrap();
        let mut input = testutil::cash_sale(&product, 1);
        input.payment_method = PaymentMethod::Qris;
        input.paid_amount = 0;
        let sale = pos.transactions().create(&cashier, input).await.unwrap();
        pos.sessions().end_session(&cashier, 0, None).await.unwrap();

        let closure = pos
            .closures()
            .close_day(&admin, sale.transaction.business_date, 0, None)
            .await
            .unwrap();

        assert_eq!(closure.system_qris_total, 30_000);
        assert_eq!(closure.system_cash_total, 0);
        assert!(sales_in_for(&pos, &closure.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_reopen_day_compensates_the_drawer() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let date = finished_cash_day(&pos, 50_000).await;

        let closure = pos
            .closures()
            .close_day(&admin, date, 50_000, None)
            .await
            .unwrap();
        let reopened = pos
            .closures()
            .reopen_day(&admin, &closure.id)
            .await
            .unwrap();
        assert_eq!(reopened.id, closure.id);

        let status = pos.closures().status(&admin, date).await.unwrap();
        assert!(!status.is_closed);
        assert!(status.closure.is_none());

        // SalesIn +50000 followed by its Adjustment(-50000); balance nets out.
        let mut conn = pos.database().acquire().await.unwrap();
        let compensations = pos
            .database()
            .drawer()
            .fetch_by_kind_and_reference(&mut *conn, DrawerMovementKind::Adjustment, &closure.id)
            .await
            .unwrap();
        assert_eq!(compensations.len(), 1);
        assert_eq!(compensations[0].amount, -50_000);
        drop(conn);

        let summary = pos.drawer().summary().await.unwrap();
        assert_eq!(summary.current_balance, 0);

        // The day can be closed again afterwards.
        pos.closures()
            .close_day(&admin, date, 50_000, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reopen_unknown_closure_is_not_found() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        let err = pos
            .closures()
            .reopen_day(&admin, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_status_shows_live_totals_and_blockers() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Kopi", 20_000, 10).await;

        pos.sessions().start_session(&cashier, 0).await.unwrap();
        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();

        let status = pos
            .closures()
            .status(&admin, sale.transaction.business_date)
            .await
            .unwrap();

        assert!(!status.is_closed);
        assert_eq!(status.live.cash_total, 20_000);
        assert_eq!(status.live.transaction_count, 1);
        assert_eq!(status.open_sessions.len(), 1);
        assert_eq!(status.open_sessions[0].cashier_id, "c1");
    }

    #[tokio::test]
    async fn test_closure_operations_require_admin() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let date = today(&pos);

        let err = pos
            .closures()
            .close_day(&cashier, date, 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        let err = pos.closures().reopen_day(&cashier, "x").await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));

        let err = pos.closures().status(&cashier, date).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
    }
}
