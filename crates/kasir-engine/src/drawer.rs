//! # Drawer Service
//!
//! The store-wide cash position: one singleton balance, one append-only
//! movement ledger.
//!
//! ## Ledger Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every balance change appends exactly ONE movement:                     │
//! │                                                                         │
//! │    balance_after = balance_before + amount     (amount is signed)       │
//! │    singleton balance = latest movement's balance_after                  │
//! │                                                                         │
//! │  The balance row is created lazily at zero on first touch. A change     │
//! │  is a fetch + compare-and-set + movement row in one transaction, so a   │
//! │  concurrent deposit and withdrawal can never both apply against the     │
//! │  same "before" figure.                                                  │
//! │                                                                         │
//! │  Withdrawals require balance ≥ amount; a failed withdrawal writes       │
//! │  NOTHING to the ledger. Adjustments are signed and unbounded (they      │
//! │  correct the record, the record does not constrain them).               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use kasir_core::time::{business_date_of, business_day_bounds};
use kasir_core::validation::{
    normalize_pagination, validate_non_negative_amount, validate_non_zero_amount, validate_notes,
    validate_positive_amount,
};
use kasir_core::{Actor, CashDrawerMovement, DrawerMovementKind, SessionStatus};
use kasir_db::{Database, DbError, SessionFilter};

use crate::error::{EngineError, EngineResult};
use crate::{audit, Page, StoreSettings};

/// Read-only projection of the drawer: live balance plus one business
/// day's activity and the open-shift count.
#[derive(Debug, Clone, Serialize)]
pub struct DrawerSummary {
    /// The business date the movement figures cover.
    pub date: NaiveDate,
    pub current_balance: i64,
    /// Cash that entered today (deposits, sales-in, shift floats).
    pub today_cash_in: i64,
    /// Cash that left today (withdrawals), as a positive figure.
    pub today_cash_out: i64,
    /// Net signed effect of today's adjustments.
    pub today_adjustment: i64,
    pub open_sessions: i64,
}

/// Cash drawer ledger operations.
#[derive(Debug, Clone)]
pub struct DrawerService {
    db: Database,
    settings: StoreSettings,
}

impl DrawerService {
    pub(crate) fn new(db: Database, settings: StoreSettings) -> Self {
        DrawerService { db, settings }
    }

    /// Puts cash into the drawer.
    pub async fn deposit(
        &self,
        actor: &Actor,
        amount: i64,
        notes: Option<String>,
    ) -> EngineResult<CashDrawerMovement> {
        validate_positive_amount("amount", amount)?;
        let notes = validate_notes(notes.as_deref())?;

        self.mutate(
            actor,
            DrawerMovementKind::Deposit,
            "drawer.deposit",
            notes,
            |before| Ok(before + amount),
        )
        .await
    }

    /// Takes cash out of the drawer.
    ///
    /// ## Errors
    /// - `Validation` unless `amount > 0`
    /// - `Invalid` "insufficient balance" when the drawer holds less than
    ///   `amount`; nothing is written in that case
    pub async fn withdraw(
        &self,
        actor: &Actor,
        amount: i64,
        notes: Option<String>,
    ) -> EngineResult<CashDrawerMovement> {
        validate_positive_amount("amount", amount)?;
        let notes = validate_notes(notes.as_deref())?;

        self.mutate(
            actor,
            DrawerMovementKind::Withdrawal,
            "drawer.withdraw",
            notes,
            |before| {
                if before < amount {
                    return Err(EngineError::Invalid("insufficient balance".to_string()));
                }
                Ok(before - amount)
            },
        )
        .await
    }

    /// Applies a signed correction of any magnitude.
    pub async fn adjust(
        &self,
        actor: &Actor,
        amount: i64,
        notes: Option<String>,
    ) -> EngineResult<CashDrawerMovement> {
        validate_non_zero_amount("amount", amount)?;
        let notes = validate_notes(notes.as_deref())?;

        self.mutate(
            actor,
            DrawerMovementKind::Adjustment,
            "drawer.adjust",
            notes,
            |before| Ok(before + amount),
        )
        .await
    }

    /// Sets the balance to a counted figure, recording the implied delta.
    pub async fn set_balance(
        &self,
        actor: &Actor,
        target: i64,
        notes: Option<String>,
    ) -> EngineResult<CashDrawerMovement> {
        validate_non_negative_amount("target balance", target)?;
        let notes = validate_notes(notes.as_deref())?;

        self.mutate(
            actor,
            DrawerMovementKind::Adjustment,
            "drawer.set_balance",
            notes,
            |_| Ok(target),
        )
        .await
    }

    /// Today's drawer picture: live balance, the day's cash in/out and
    /// adjustments, and how many shifts are open right now.
    pub async fn summary(&self) -> EngineResult<DrawerSummary> {
        let now = Utc::now();
        let date = business_date_of(now, self.settings.store_offset);
        let (start, end) = business_day_bounds(date, self.settings.store_offset);

        let drawer = self.db.drawer();
        let current_balance = drawer
            .get_balance()
            .await?
            .map_or(0, |b| b.current_balance);

        let mut today_cash_in = 0;
        let mut today_cash_out = 0;
        let mut today_adjustment = 0;
        for movement in drawer.list_in_window(start, end).await? {
            if movement.kind == DrawerMovementKind::Adjustment {
                today_adjustment += movement.amount;
            } else if movement.amount >= 0 {
                today_cash_in += movement.amount;
            } else {
                today_cash_out += -movement.amount;
            }
        }

        let open_sessions = self
            .db
            .sessions()
            .count(&SessionFilter {
                status: Some(SessionStatus::Open),
                ..SessionFilter::default()
            })
            .await?;

        Ok(DrawerSummary {
            date,
            current_balance,
            today_cash_in,
            today_cash_out,
            today_adjustment,
            open_sessions,
        })
    }

    /// Lists drawer movements, newest first, optionally by kind.
    pub async fn movements(
        &self,
        kind: Option<DrawerMovementKind>,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> EngineResult<Page<CashDrawerMovement>> {
        let (page, page_size) = normalize_pagination(page, page_size);
        let drawer = self.db.drawer();
        let total = drawer.count_movements(kind).await?;
        let data = drawer
            .list_movements(kind, page_size, (page - 1) * page_size)
            .await?;

        Ok(Page {
            data,
            total,
            page,
            page_size,
        })
    }

    /// Shared mutation path: fetch (lazily creating at zero), compute the
    /// new balance, compare-and-set, movement row, audit row, all in one
    /// transaction.
    async fn mutate(
        &self,
        actor: &Actor,
        kind: DrawerMovementKind,
        action: &str,
        notes: Option<String>,
        compute: impl FnOnce(i64) -> EngineResult<i64>,
    ) -> EngineResult<CashDrawerMovement> {
        let drawer = self.db.drawer();

        let mut tx = self.db.begin().await?;

        let now = Utc::now();
        let balance = drawer.fetch_balance(&mut *tx, now).await?;
        let balance_before = balance.current_balance;
        let balance_after = compute(balance_before)?;

        let updated = drawer
            .set_balance_cas(&mut *tx, balance_before, balance_after, now)
            .await?;
        if updated == 0 {
            return Err(EngineError::Conflict(
                "drawer balance changed concurrently".to_string(),
            ));
        }

        let movement = CashDrawerMovement {
            id: Uuid::new_v4().to_string(),
            kind,
            amount: balance_after - balance_before,
            balance_before,
            balance_after,
            reference: None,
            notes: notes.clone(),
            actor_id: actor.actor_id.clone(),
            created_at: now,
        };
        drawer.record_movement(&mut *tx, &movement).await?;

        self.db
            .audit()
            .record(
                &mut *tx,
                &audit::entry(
                    actor,
                    action,
                    "cash_drawer",
                    "1",
                    json!({
                        "movementId": movement.id,
                        "amount": movement.amount,
                        "balanceAfter": balance_after,
                        "notes": notes,
                    }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            kind = ?kind,
            amount = movement.amount,
            balance_after,
            "Drawer updated"
        );

        Ok(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testutil;

    #[tokio::test]
    async fn test_deposit_starts_the_ledger_from_zero() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        let movement = pos
            .drawer()
            .deposit(&admin, 50_000, Some("float".to_string()))
            .await
            .unwrap();

        assert_eq!(movement.kind, DrawerMovementKind::Deposit);
        assert_eq!(movement.amount, 50_000);
        assert_eq!(movement.balance_before, 0);
        assert_eq!(movement.balance_after, 50_000);
        assert_eq!(movement.notes.as_deref(), Some("float"));
    }

    #[tokio::test]
    async fn test_withdraw_decrements_balance() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.drawer().deposit(&admin, 50_000, None).await.unwrap();
        let movement = pos
            .drawer()
            .withdraw(&admin, 20_000, Some("bank run".to_string()))
            .await
            .unwrap();

        assert_eq!(movement.kind, DrawerMovementKind::Withdrawal);
        assert_eq!(movement.amount, -20_000);
        assert_eq!(movement.balance_after, 30_000);
    }

    #[tokio::test]
    async fn test_overdraw_is_rejected_and_writes_nothing() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.drawer().deposit(&admin, 5_000, None).await.unwrap();
        let err = pos
            .drawer()
            .withdraw(&admin, 10_000, None)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Invalid(ref m) if m == "insufficient balance"));

        // The failed attempt leaves no trace in the ledger.
        let page = pos.drawer().movements(None, None, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].kind, DrawerMovementKind::Deposit);

        let summary = pos.drawer().summary().await.unwrap();
        assert_eq!(summary.current_balance, 5_000);
    }

    #[tokio::test]
    async fn test_adjustment_is_signed_and_unbounded() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.drawer().deposit(&admin, 5_000, None).await.unwrap();
        let movement = pos
            .drawer()
            .adjust(&admin, -12_000, Some("audit correction".to_string()))
            .await
            .unwrap();

        // Unlike withdrawals, corrections may push the balance negative.
        assert_eq!(movement.balance_after, -7_000);

        let summary = pos.drawer().summary().await.unwrap();
        assert_eq!(summary.current_balance, -7_000);
    }

    #[tokio::test]
    async fn test_zero_adjustment_is_rejected() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        let err = pos.drawer().adjust(&admin, 0, None).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_balance_records_implied_delta() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.drawer().deposit(&admin, 80_000, None).await.unwrap();
        let movement = pos
            .drawer()
            .set_balance(&admin, 75_000, Some("recount".to_string()))
            .await
            .unwrap();

        assert_eq!(movement.kind, DrawerMovementKind::Adjustment);
        assert_eq!(movement.amount, -5_000);
        assert_eq!(movement.balance_after, 75_000);
    }

    #[tokio::test]
    async fn test_summary_folds_todays_movements() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.drawer().deposit(&admin, 50_000, None).await.unwrap();
        pos.drawer().withdraw(&admin, 20_000, None).await.unwrap();
        pos.drawer().adjust(&admin, -5_000, None).await.unwrap();
        pos.sessions()
            .start_session(&testutil::cashier("c1"), 0)
            .await
            .unwrap();

        let summary = pos.drawer().summary().await.unwrap();
        assert_eq!(summary.current_balance, 25_000);
        assert_eq!(summary.today_cash_in, 50_000);
        assert_eq!(summary.today_cash_out, 20_000);
        assert_eq!(summary.today_adjustment, -5_000);
        assert_eq!(summary.open_sessions, 1);
    }

    #[tokio::test]
    async fn test_empty_drawer_summary_is_all_zeroes() {
        let pos = testutil::pos().await;

        let summary = pos.drawer().summary().await.unwrap();
        assert_eq!(summary.current_balance, 0);
        assert_eq!(summary.today_cash_in, 0);
        assert_eq!(summary.today_cash_out, 0);
        assert_eq!(summary.today_adjustment, 0);
        assert_eq!(summary.open_sessions, 0);
    }

    #[tokio::test]
    async fn test_ledger_replays_to_current_balance() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.drawer().deposit(&admin, 100_000, None).await.unwrap();
        pos.drawer().withdraw(&admin, 30_000, None).await.unwrap();
        pos.drawer().adjust(&admin, 2_500, None).await.unwrap();
        pos.drawer().set_balance(&admin, 70_000, None).await.unwrap();

        let page = pos.drawer().movements(None, None, None).await.unwrap();
        assert_eq!(page.total, 4);

        let mut replayed = 0;
        for m in page.data.iter().rev() {
            assert_eq!(m.balance_after, m.balance_before + m.amount);
            replayed += m.amount;
        }
        let summary = pos.drawer().summary().await.unwrap();
        assert_eq!(replayed, summary.current_balance);
    }

    #[tokio::test]
    async fn test_movements_filter_by_kind() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        pos.drawer().deposit(&admin, 10_000, None).await.unwrap();
        pos.drawer().deposit(&admin, 15_000, None).await.unwrap();
        pos.drawer().withdraw(&admin, 5_000, None).await.unwrap();

        let deposits = pos
            .drawer()
            .movements(Some(DrawerMovementKind::Deposit), None, None)
            .await
            .unwrap();
        assert_eq!(deposits.total, 2);

        let withdrawals = pos
            .drawer()
            .movements(Some(DrawerMovementKind::Withdrawal), None, None)
            .await
            .unwrap();
        assert_eq!(withdrawals.total, 1);
    }
}
