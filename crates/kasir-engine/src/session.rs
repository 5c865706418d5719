//! # Session Service
//!
//! Cashier shift lifecycle: open, inspect, close.
//!
//! ## Shift State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   start_session ──▶ Open ──── end_session ──▶ Closed (terminal)         │
//! │                      │                                                  │
//! │                      │  at most ONE Open per cashier, enforced by a     │
//! │                      │  partial unique index - a racing second open     │
//! │                      │  fails at the insert, not after it               │
//! │                      ▼                                                  │
//! │            live totals = SUM over the shift's completed sales           │
//! │                                                                         │
//! │   end_session freezes the totals:                                       │
//! │     expected_cash = opening_cash + cash_total                           │
//! │     difference    = closing_cash − expected_cash                        │
//! │                                                                         │
//! │   Sales voided AFTER the shift closed do not rewrite the frozen         │
//! │   figures; the void shows up in the transaction list instead.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use kasir_core::time::business_day_bounds;
use kasir_core::validation::{normalize_pagination, validate_non_negative_amount, validate_notes};
use kasir_core::{Actor, CashierSession, SessionStatus};
use kasir_db::{Database, DbError, SessionFilter};

use crate::error::{EngineError, EngineResult};
use crate::{audit, require_admin, Page, StoreSettings};

/// Query parameters for the privileged session listing.
///
/// `date_from`/`date_to` select shifts whose start instant falls on those
/// store-local calendar dates (inclusive).
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
    pub cashier_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Shift lifecycle operations.
#[derive(Debug, Clone)]
pub struct SessionService {
    db: Database,
    settings: StoreSettings,
}

impl SessionService {
    pub(crate) fn new(db: Database, settings: StoreSettings) -> Self {
        SessionService { db, settings }
    }

    /// Opens a shift for the calling cashier.
    ///
    /// ## Errors
    /// - `Validation` on negative opening cash
    /// - `Conflict` when the cashier already has an open shift
    pub async fn start_session(
        &self,
        actor: &Actor,
        opening_cash: i64,
    ) -> EngineResult<CashierSession> {
        validate_non_negative_amount("opening cash", opening_cash)?;

        let session = CashierSession {
            id: Uuid::new_v4().to_string(),
            cashier_id: actor.actor_id.clone(),
            start_time: Utc::now(),
            end_time: None,
            opening_cash,
            closing_cash: None,
            expected_cash: None,
            difference: None,
            total_sales: 0,
            cash_total: 0,
            non_cash_total: 0,
            transaction_count: 0,
            status: SessionStatus::Open,
            notes: None,
        };

        let sessions = self.db.sessions();
        let mut tx = self.db.begin().await?;

        if sessions
            .fetch_open_for_cashier(&mut *tx, &actor.actor_id)
            .await?
            .is_some()
        {
            return Err(EngineError::Conflict(format!(
                "cashier {} already has an open shift",
                actor.actor_id
            )));
        }

        // The partial unique index backs this up against a racing open.
        match sessions.insert(&mut *tx, &session).await {
            Err(e) if e.is_unique_violation() => {
                return Err(EngineError::Conflict(format!(
                    "cashier {} already has an open shift",
                    actor.actor_id
                )));
            }
            other => other?,
        }

        self.db
            .audit()
            .record(
                &mut *tx,
                &audit::entry(
                    actor,
                    "session.start",
                    "cashier_session",
                    &session.id,
                    json!({ "openingCash": opening_cash }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            session_id = %session.id,
            cashier_id = %session.cashier_id,
            opening_cash,
            "Shift opened"
        );

        Ok(session)
    }

    /// The cashier's open shift with live totals.
    ///
    /// Totals are summed from the shift's completed transactions at call
    /// time; they are not stored until the shift ends.
    ///
    /// ## Errors
    /// - `NotFound` when the cashier has no open shift
    pub async fn active_session(&self, cashier_id: &str) -> EngineResult<CashierSession> {
        let sessions = self.db.sessions();
        let mut conn = self.db.acquire().await?;

        let mut session = sessions
            .fetch_open_for_cashier(&mut *conn, cashier_id)
            .await?
            .ok_or_else(|| EngineError::not_found("active session", cashier_id))?;

        let totals = sessions.compute_totals(&mut *conn, &session.id).await?;
        session.total_sales = totals.total_sales;
        session.cash_total = totals.cash_total;
        session.non_cash_total = totals.non_cash_total;
        session.transaction_count = totals.transaction_count;

        Ok(session)
    }

    /// Closes the calling cashier's open shift and freezes its figures.
    ///
    /// ## Errors
    /// - `Validation` on negative closing cash
    /// - `NotFound` when the cashier has no open shift
    /// - `Conflict` when a concurrent call closed the shift first
    pub async fn end_session(
        &self,
        actor: &Actor,
        closing_cash: i64,
        notes: Option<String>,
    ) -> EngineResult<CashierSession> {
        validate_non_negative_amount("closing cash", closing_cash)?;
        let notes = validate_notes(notes.as_deref())?;

        let sessions = self.db.sessions();
        let mut tx = self.db.begin().await?;

        let mut session = sessions
            .fetch_open_for_cashier(&mut *tx, &actor.actor_id)
            .await?
            .ok_or_else(|| EngineError::not_found("active session", &actor.actor_id))?;

        let totals = sessions.compute_totals(&mut *tx, &session.id).await?;
        let expected_cash = session.opening_cash + totals.cash_total;

        session.end_time = Some(Utc::now());
        session.closing_cash = Some(closing_cash);
        session.expected_cash = Some(expected_cash);
        session.difference = Some(closing_cash - expected_cash);
        session.total_sales = totals.total_sales;
        session.cash_total = totals.cash_total;
        session.non_cash_total = totals.non_cash_total;
        session.transaction_count = totals.transaction_count;
        session.status = SessionStatus::Closed;
        session.notes = notes;

        let updated = sessions.close(&mut *tx, &session).await?;
        if updated == 0 {
            return Err(EngineError::Conflict(format!(
                "shift {} is already closed",
                session.id
            )));
        }

        self.db
            .audit()
            .record(
                &mut *tx,
                &audit::entry(
                    actor,
                    "session.end",
                    "cashier_session",
                    &session.id,
                    json!({
                        "closingCash": closing_cash,
                        "expectedCash": expected_cash,
                        "difference": closing_cash - expected_cash,
                        "transactionCount": totals.transaction_count,
                    }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            session_id = %session.id,
            cashier_id = %session.cashier_id,
            expected_cash,
            difference = closing_cash - expected_cash,
            "Shift closed"
        );

        Ok(session)
    }

    /// Lists shifts, filtered and paginated. Admin only.
    pub async fn list_sessions(
        &self,
        actor: &Actor,
        query: &SessionQuery,
    ) -> EngineResult<Page<CashierSession>> {
        require_admin(actor, "list sessions")?;

        let (page, page_size) = normalize_pagination(query.page, query.page_size);

        let filter = SessionFilter {
            status: query.status,
            cashier_id: query.cashier_id.clone(),
            start_from: query
                .date_from
                .map(|d| business_day_bounds(d, self.settings.store_offset).0),
            start_before: query
                .date_to
                .map(|d| business_day_bounds(d, self.settings.store_offset).1),
        };

        let sessions = self.db.sessions();
        let total = sessions.count(&filter).await?;
        let data = sessions
            .list(&filter, page_size, (page - 1) * page_size)
            .await?;

        Ok(Page {
            data,
            total,
            page,
            page_size,
        })
    }

    /// Fetches one shift by ID. Admin only.
    pub async fn get_session(&self, actor: &Actor, id: &str) -> EngineResult<CashierSession> {
        require_admin(actor, "get session")?;

        self.db
            .sessions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("session", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testutil;

    #[tokio::test]
    async fn test_start_session_opens_shift() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");

        let session = pos
            .sessions()
            .start_session(&cashier, 100_000)
            .await
            .unwrap();

        assert_eq!(session.cashier_id, "c1");
        assert_eq!(session.opening_cash, 100_000);
        assert_eq!(session.status, SessionStatus::Open);
        assert!(session.end_time.is_none());
        assert!(session.closing_cash.is_none());
    }

    #[tokio::test]
    async fn test_start_session_rejects_negative_opening_cash() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");

        let err = pos
            .sessions()
            .start_session(&cashier, -1)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_second_open_shift_conflicts() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");

        pos.sessions().start_session(&cashier, 0).await.unwrap();
        let err = pos
            .sessions()
            .start_session(&cashier, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_two_cashiers_open_independently() {
        let pos = testutil::pos().await;

        pos.sessions()
            .start_session(&testutil::cashier("c1"), 0)
            .await
            .unwrap();
        pos.sessions()
            .start_session(&testutil::cashier("c2"), 0)
            .await
            .unwrap();

        let active = pos.sessions().active_session("c2").await.unwrap();
        assert_eq!(active.cashier_id, "c2");
    }

    #[tokio::test]
    async fn test_end_session_without_open_shift_is_not_found() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");

        let err = pos
            .sessions()
            .end_session(&cashier, 0, None)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_shift_cash_reconciliation() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Kopi Susu", 20_000, 50).await;

        pos.sessions()
            .start_session(&cashier, 100_000)
            .await
            .unwrap();
        pos.transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();

        let closed = pos
            .sessions()
            .end_session(&cashier, 120_000, None)
            .await
            .unwrap();

        assert_eq!(closed.status, SessionStatus::Closed);
        assert_eq!(closed.expected_cash, Some(120_000));
        assert_eq!(closed.closing_cash, Some(120_000));
        assert_eq!(closed.difference, Some(0));
        assert_eq!(closed.cash_total, 20_000);
        assert_eq!(closed.transaction_count, 1);
        assert!(closed.end_time.is_some());
    }

    #[tokio::test]
    async fn test_shortfall_shows_as_negative_difference() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");

        pos.sessions()
            .start_session(&cashier, 50_000)
            .await
            .unwrap();
        let closed = pos
            .sessions()
            .end_session(&cashier, 45_000, Some("drawer short".to_string()))
            .await
            .unwrap();

        assert_eq!(closed.expected_cash, Some(50_000));
        assert_eq!(closed.difference, Some(-5_000));
        assert_eq!(closed.notes.as_deref(), Some("drawer short"));
    }

    #[tokio::test]
    async fn test_voided_sale_leaves_frozen_totals_out() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Teh Botol", 5_000, 10).await;

        pos.sessions().start_session(&cashier, 0).await.unwrap();
        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 2))
            .await
            .unwrap();
        pos.transactions()
            .void(&admin, &sale.transaction.id, "wrong item")
            .await
            .unwrap();

        // Voided before close: the sale no longer counts toward the shift.
        let closed = pos
            .sessions()
            .end_session(&cashier, 0, None)
            .await
            .unwrap();
        assert_eq!(closed.cash_total, 0);
        assert_eq!(closed.transaction_count, 0);
        assert_eq!(closed.expected_cash, Some(0));
    }

    #[tokio::test]
    async fn test_active_session_reports_live_totals() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Roti", 12_000, 10).await;

        pos.sessions()
            .start_session(&cashier, 10_000)
            .await
            .unwrap();
        pos.transactions()
            .create(&cashier, testutil::cash_sale(&product, 2))
            .await
            .unwrap();

        let active = pos.sessions().active_session("c1").await.unwrap();
        assert_eq!(active.total_sales, 24_000);
        assert_eq!(active.cash_total, 24_000);
        assert_eq!(active.transaction_count, 1);
        assert_eq!(active.status, SessionStatus::Open);
    }

    #[tokio::test]
    async fn test_list_sessions_is_admin_only() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");

        let err = pos
            .sessions()
            .list_sessions(&cashier, &SessionQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_list_sessions_pages() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();

        for i in 0..3 {
            let cashier = testutil::cashier(&format!("c{i}"));
            pos.sessions().start_session(&cashier, 0).await.unwrap();
            pos.sessions().end_session(&cashier, 0, None).await.unwrap();
        }

        let query = SessionQuery {
            page_size: Some(2),
            ..Default::default()
        };
        let page = pos.sessions().list_sessions(&admin, &query).await.unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 2);
    }
}
