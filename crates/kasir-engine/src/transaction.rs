//! # Transaction Service
//!
//! Sale creation, void, and lookup.
//!
//! ## Sale Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create() runs as ONE database transaction:                             │
//! │                                                                         │
//! │    1. open shift?            ── no ──▶ InvalidState "no active shift"   │
//! │    2. resolve products       ── inactive/unknown ──▶ NotFound           │
//! │       (price + name snapshots; caller prices are never trusted)         │
//! │    3. price the cart         subtotal − discount + tax                  │
//! │    4. settle payment         Cash: paid ≥ total; QRIS: paid := total    │
//! │    5. claim invoice number   atomic per-date counter                    │
//! │    6. insert sale + items                                               │
//! │    7. per tracked item:      stock := max(stock − qty, 0)               │
//! │                              + StockMovement(Out, ref = invoice)        │
//! │    8. audit row                                                         │
//! │                                                                         │
//! │  Any failure rolls the whole sale back; there is no window where the    │
//! │  sale exists without its stock effect.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Void
//!
//! One-way `Completed → Voided`, admin only, guarded in SQL so a second
//! void affects zero rows and cannot double-restore stock. Stock comes
//! back via movements tagged `VOID-{invoiceNo}`. Figures a closed shift
//! already froze stay frozen; the drawer ledger is untouched.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use kasir_core::pricing::{compute_totals, settle_payment};
use kasir_core::time::{business_date_of, invoice_number};
use kasir_core::validation::{normalize_pagination, validate_notes, validate_reason};
use kasir_core::{
    Actor, CoreError, DiscountKind, Money, PaymentMethod, PricedLine, StockMovement,
    StockMovementKind, Transaction, TransactionItem, TransactionStatus,
};
use kasir_db::{Database, DbError, TransactionFilter};

use crate::error::{EngineError, EngineResult};
use crate::{audit, require_admin, Page, StoreSettings};

/// Input for a new sale. Prices are deliberately absent: the catalog is
/// authoritative.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub items: Vec<NewTransactionItem>,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub tax: i64,
    pub payment_method: PaymentMethod,
    pub paid_amount: i64,
    pub notes: Option<String>,
}

/// One cart line: which product, how many.
#[derive(Debug, Clone)]
pub struct NewTransactionItem {
    pub product_id: String,
    pub quantity: i64,
}

/// A transaction together with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithItems {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

/// Query parameters for the transaction listing.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub session_id: Option<String>,
    /// Honored for admins; non-admin callers are always scoped to
    /// their own rows.
    pub cashier_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<TransactionStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Sale creation, void, and lookup.
#[derive(Debug, Clone)]
pub struct TransactionService {
    db: Database,
    settings: StoreSettings,
}

impl TransactionService {
    pub(crate) fn new(db: Database, settings: StoreSettings) -> Self {
        TransactionService { db, settings }
    }

    /// Creates a completed sale for the calling cashier.
    ///
    /// ## Errors
    /// - `InvalidState` "no active shift" when the cashier has no open shift
    /// - `NotFound` for an unknown or inactive product
    /// - `Validation`/`Invalid` for bad quantities, discounts, or payment
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewTransaction,
    ) -> EngineResult<TransactionWithItems> {
        if input.items.is_empty() {
            return Err(CoreError::EmptySale.into());
        }
        let notes = validate_notes(input.notes.as_deref())?;

        let sessions = self.db.sessions();
        let products = self.db.products();
        let transactions = self.db.transactions();
        let stock = self.db.stock();

        let mut tx = self.db.begin().await?;

        let session = sessions
            .fetch_open_for_cashier(&mut *tx, &actor.actor_id)
            .await?
            .ok_or_else(|| EngineError::InvalidState("no active shift".to_string()))?;

        // Snapshot price and name per line from the catalog.
        let mut lines = Vec::with_capacity(input.items.len());
        let mut snapshots = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let product = products
                .fetch_by_id(&mut *tx, &item.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| EngineError::not_found("product", &item.product_id))?;

            lines.push(PricedLine::new(
                Money::from_rupiah(product.price),
                item.quantity,
            ));
            snapshots.push((product, item.quantity));
        }

        let totals = compute_totals(
            &lines,
            input.discount_kind,
            input.discount_value,
            input.tax,
        )?;
        let settlement = settle_payment(
            input.payment_method,
            totals.total,
            Money::from_rupiah(input.paid_amount),
        )?;

        let now = Utc::now();
        let business_date = business_date_of(now, self.settings.store_offset);
        let seq = transactions.next_invoice_seq(&mut *tx, business_date).await?;
        let invoice_no = invoice_number(&self.settings.invoice_prefix, business_date, seq);

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            invoice_no: invoice_no.clone(),
            cashier_id: actor.actor_id.clone(),
            session_id: session.id.clone(),
            business_date,
            subtotal: totals.subtotal.rupiah(),
            discount_amount: totals.discount_amount.rupiah(),
            tax: totals.tax.rupiah(),
            total: totals.total.rupiah(),
            payment_method: input.payment_method,
            paid_amount: settlement.paid_amount.rupiah(),
            change_amount: settlement.change_amount.rupiah(),
            status: TransactionStatus::Completed,
            void_reason: None,
            voided_by: None,
            voided_at: None,
            notes,
            created_at: now,
        };
        transactions.insert(&mut *tx, &transaction).await?;

        let mut items = Vec::with_capacity(snapshots.len());
        for (product, quantity) in &snapshots {
            let item = TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction.id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                unit_price: product.price,
                quantity: *quantity,
                line_total: product.price * quantity,
            };
            transactions.insert_item(&mut *tx, &item).await?;
            items.push(item);
        }

        // Stock debit per tracked line. Re-read inside the transaction so a
        // product appearing on two lines decrements cumulatively.
        for item in &items {
            let product = products
                .fetch_by_id(&mut *tx, &item.product_id)
                .await?
                .ok_or_else(|| EngineError::not_found("product", &item.product_id))?;
            if !product.track_stock {
                continue;
            }

            let stock_before = product.stock;
            let stock_after = (stock_before - item.quantity).max(0);
            let updated = products
                .set_stock_cas(&mut *tx, &product.id, stock_before, stock_after, now)
                .await?;
            if updated == 0 {
                return Err(EngineError::Conflict(format!(
                    "stock for product {} changed concurrently",
                    product.id
                )));
            }

            stock
                .record_movement(
                    &mut *tx,
                    &StockMovement {
                        id: Uuid::new_v4().to_string(),
                        product_id: product.id.clone(),
                        kind: StockMovementKind::Out,
                        quantity: stock_after - stock_before,
                        stock_before,
                        stock_after,
                        reference: Some(invoice_no.clone()),
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
                    "transaction.create",
                    "transaction",
                    &transaction.id,
                    json!({
                        "invoiceNo": invoice_no,
                        "total": transaction.total,
                        "paymentMethod": input.payment_method,
                        "itemCount": items.len(),
                    }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            invoice_no = %invoice_no,
            total = transaction.total,
            payment_method = ?input.payment_method,
            cashier_id = %actor.actor_id,
            "Sale completed"
        );

        Ok(TransactionWithItems {
            transaction,
            items,
        })
    }

    /// Voids a completed sale. Admin only.
    ///
    /// Restores stock for tracked items with movements tagged
    /// `VOID-{invoiceNo}`. Session figures frozen by an earlier shift end
    /// and the cash drawer ledger are left as they were.
    ///
    /// ## Errors
    /// - `Forbidden` for non-admin callers
    /// - `Validation` on an empty reason
    /// - `NotFound` for an unknown transaction
    /// - `Conflict` when the transaction is already voided
    pub async fn void(&self, actor: &Actor, id: &str, reason: &str) -> EngineResult<Transaction> {
        require_admin(actor, "void transaction")?;
        let reason = validate_reason(reason)?;

        let transactions = self.db.transactions();
        let products = self.db.products();
        let stock = self.db.stock();

        let mut tx = self.db.begin().await?;

        let mut transaction = transactions
            .fetch_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| EngineError::not_found("transaction", id))?;

        let now = Utc::now();
        let updated = transactions
            .mark_voided(&mut *tx, id, &reason, &actor.actor_id, now)
            .await?;
        if updated == 0 {
            return Err(EngineError::Conflict(format!(
                "transaction {} is already voided",
                transaction.invoice_no
            )));
        }

        let void_reference = format!("VOID-{}", transaction.invoice_no);
        let items = transactions.fetch_items(&mut *tx, id).await?;
        for item in &items {
            let Some(product) = products.fetch_by_id(&mut *tx, &item.product_id).await? else {
                warn!(
                    product_id = %item.product_id,
                    invoice_no = %transaction.invoice_no,
                    "Voided item references a missing product; skipping restore"
                );
                continue;
            };
            if !product.track_stock {
                continue;
            }

            let stock_before = product.stock;
            let stock_after = stock_before + item.quantity;
            let restored = products
                .set_stock_cas(&mut *tx, &product.id, stock_before, stock_after, now)
                .await?;
            if restored == 0 {
                return Err(EngineError::Conflict(format!(
                    "stock for product {} changed concurrently",
                    product.id
                )));
            }

            stock
                .record_movement(
                    &mut *tx,
                    &StockMovement {
                        id: Uuid::new_v4().to_string(),
                        product_id: product.id.clone(),
                        kind: StockMovementKind::In,
                        quantity: item.quantity,
                        stock_before,
                        stock_after,
                        reference: Some(void_reference.clone()),
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
                    "transaction.void",
                    "transaction",
                    id,
                    json!({
                        "invoiceNo": transaction.invoice_no,
                        "reason": reason,
                        "restoredItems": items.len(),
                    }),
                ),
            )
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        transaction.status = TransactionStatus::Voided;
        transaction.void_reason = Some(reason.clone());
        transaction.voided_by = Some(actor.actor_id.clone());
        transaction.voided_at = Some(now);

        info!(
            invoice_no = %transaction.invoice_no,
            voided_by = %actor.actor_id,
            reason = %reason,
            "Sale voided"
        );

        Ok(transaction)
    }

    /// Fetches one sale with its items. Owner or admin.
    pub async fn get(&self, actor: &Actor, id: &str) -> EngineResult<TransactionWithItems> {
        let transactions = self.db.transactions();

        let transaction = transactions
            .get_by_id(id)
            .await?
            .ok_or_else(|| EngineError::not_found("transaction", id))?;

        if !actor.is_admin() && transaction.cashier_id != actor.actor_id {
            return Err(EngineError::Forbidden(
                "transaction belongs to another cashier".to_string(),
            ));
        }

        let items = transactions.get_items(id).await?;

        Ok(TransactionWithItems { transaction, items })
    }

    /// Lists sales, filtered and paginated.
    ///
    /// Non-admin callers see only their own rows regardless of the
    /// `cashier_id` filter.
    pub async fn list(
        &self,
        actor: &Actor,
        query: &TransactionQuery,
    ) -> EngineResult<Page<Transaction>> {
        let (page, page_size) = normalize_pagination(query.page, query.page_size);

        let cashier_id = if actor.is_admin() {
            query.cashier_id.clone()
        } else {
            Some(actor.actor_id.clone())
        };

        let filter = TransactionFilter {
            session_id: query.session_id.clone(),
            cashier_id,
            date_from: query.date_from,
            date_to: query.date_to,
            status: query.status,
        };

        let transactions = self.db.transactions();
        let total = transactions.count(&filter).await?;
        let data = transactions
            .list(&filter, page_size, (page - 1) * page_size)
            .await?;

        Ok(Page {
            data,
            total,
            page,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    async fn open_shift(pos: &crate::Pos, cashier: &Actor) {
        pos.sessions()
            .start_session(cashier, 100_000)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_first_sale_gets_sequence_one() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Kopi Susu", 20_000, 50).await;
        open_shift(&pos, &cashier).await;

        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();

        let t = &sale.transaction;
        assert!(t.invoice_no.ends_with("-0001"));
        assert_eq!(
            t.invoice_no,
            invoice_number("INV", t.business_date, 1)
        );
        assert_eq!(t.subtotal, 20_000);
        assert_eq!(t.total, 20_000);
        assert_eq!(t.paid_amount, 20_000);
        assert_eq!(t.change_amount, 0);
        assert_eq!(t.status, TransactionStatus::Completed);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].name_snapshot, "Kopi Susu");
        assert_eq!(sale.items[0].line_total, 20_000);
    }

    #[tokio::test]
    async fn test_invoice_sequence_increments_per_sale() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Roti", 10_000, 50).await;
        open_shift(&pos, &cashier).await;

        let first = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();
        let second = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();

        assert!(first.transaction.invoice_no.ends_with("-0001"));
        assert!(second.transaction.invoice_no.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_voided_invoice_number_is_not_reused() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Roti", 10_000, 50).await;
        open_shift(&pos, &cashier).await;

        let first = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();
        pos.transactions()
            .void(&admin, &first.transaction.id, "test")
            .await
            .unwrap();

        let second = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();

        // The counter never rewinds; voiding leaves a gap.
        assert!(second.transaction.invoice_no.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_sale_without_open_shift_is_invalid_state() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Roti", 10_000, 50).await;

        let err = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::InvalidState(ref m) if m == "no active shift"));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        open_shift(&pos, &cashier).await;

        let input = NewTransaction {
            items: vec![],
            discount_kind: DiscountKind::Nominal,
            discount_value: 0,
            tax: 0,
            payment_method: PaymentMethod::Cash,
            paid_amount: 0,
            notes: None,
        };
        let err = pos.transactions().create(&cashier, input).await.unwrap_err();

        assert!(matches!(err, EngineError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        open_shift(&pos, &cashier).await;

        let input = NewTransaction {
            items: vec![NewTransactionItem {
                product_id: "nope".to_string(),
                quantity: 1,
            }],
            discount_kind: DiscountKind::Nominal,
            discount_value: 0,
            tax: 0,
            payment_method: PaymentMethod::Cash,
            paid_amount: 10_000,
            notes: None,
        };
        let err = pos.transactions().create(&cashier, input).await.unwrap_err();

        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_inactive_product_is_not_found() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_inactive_product(&pos, "Lama", 10_000).await;
        open_shift(&pos, &cashier).await;

        let err = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_nominal_discount_clamps_to_subtotal() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Permen", 2_000, 50).await;
        open_shift(&pos, &cashier).await;

        let mut input = testutil::cash_sale(&product, 1);
        input.discount_value = 10_000;
        input.paid_amount = 0;
        let sale = pos.transactions().create(&cashier, input).await.unwrap();

        assert_eq!(sale.transaction.discount_amount, 2_000);
        assert_eq!(sale.transaction.total, 0);
    }

    #[tokio::test]
    async fn test_percent_discount_above_hundred_is_rejected() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Permen", 2_000, 50).await;
        open_shift(&pos, &cashier).await;

        let mut input = testutil::cash_sale(&product, 1);
        input.discount_kind = DiscountKind::Percent;
        input.discount_value = 150;
        let err = pos.transactions().create(&cashier, input).await.unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_insufficient_cash_payment_is_rejected() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Nasi", 15_000, 50).await;
        open_shift(&pos, &cashier).await;

        let mut input = testutil::cash_sale(&product, 1);
        input.paid_amount = 10_000;
        let err = pos.transactions().create(&cashier, input).await.unwrap_err();

        assert!(matches!(err, EngineError::Invalid(ref m) if m.contains("insufficient payment")));
    }

    #[tokio::test]
    async fn test_qris_payment_is_normalized_to_total() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Nasi", 15_000, 50).await;
        open_shift(&pos, &cashier).await;

        let mut input = testutil::cash_sale(&product, 1);
        input.payment_method = PaymentMethod::Qris;
        input.paid_amount = 0;
        let sale = pos.transactions().create(&cashier, input).await.unwrap();

        assert_eq!(sale.transaction.paid_amount, 15_000);
        assert_eq!(sale.transaction.change_amount, 0);
        assert_eq!(sale.transaction.payment_method, PaymentMethod::Qris);
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_records_movement() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 10).await;
        open_shift(&pos, &cashier).await;

        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 3))
            .await
            .unwrap();

        let level = pos.stock().level(&product.id).await.unwrap();
        assert_eq!(level.stock, 7);

        let movements = pos
            .database()
            .stock()
            .list_by_reference(&sale.transaction.invoice_no)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, StockMovementKind::Out);
        assert_eq!(movements[0].quantity, -3);
        assert_eq!(movements[0].stock_before, 10);
        assert_eq!(movements[0].stock_after, 7);
    }

    #[tokio::test]
    async fn test_same_product_on_two_lines_decrements_cumulatively() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 10).await;
        open_shift(&pos, &cashier).await;

        let input = NewTransaction {
            items: vec![
                NewTransactionItem {
                    product_id: product.id.clone(),
                    quantity: 3,
                },
                NewTransactionItem {
                    product_id: product.id.clone(),
                    quantity: 4,
                },
            ],
            discount_kind: DiscountKind::Nominal,
            discount_value: 0,
            tax: 0,
            payment_method: PaymentMethod::Cash,
            paid_amount: 28_000,
            notes: None,
        };
        pos.transactions().create(&cashier, input).await.unwrap();

        let level = pos.stock().level(&product.id).await.unwrap();
        assert_eq!(level.stock, 3);
    }

    #[tokio::test]
    async fn test_oversell_clamps_stock_at_zero() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 2).await;
        open_shift(&pos, &cashier).await;

        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 5))
            .await
            .unwrap();

        let level = pos.stock().level(&product.id).await.unwrap();
        assert_eq!(level.stock, 0);

        // The movement records the delta actually applied, not the ask.
        let movements = pos
            .database()
            .stock()
            .list_by_reference(&sale.transaction.invoice_no)
            .await
            .unwrap();
        assert_eq!(movements[0].quantity, -2);
        assert_eq!(movements[0].stock_after, 0);
    }

    #[tokio::test]
    async fn test_untracked_product_skips_the_stock_ledger() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_untracked_product(&pos, "Jasa Bungkus", 1_000).await;
        open_shift(&pos, &cashier).await;

        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 3))
            .await
            .unwrap();

        let movements = pos
            .database()
            .stock()
            .list_by_reference(&sale.transaction.invoice_no)
            .await
            .unwrap();
        assert!(movements.is_empty());
    }

    #[tokio::test]
    async fn test_failed_sale_rolls_back_completely() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 10).await;
        open_shift(&pos, &cashier).await;

        let input = NewTransaction {
            items: vec![
                NewTransactionItem {
                    product_id: product.id.clone(),
                    quantity: 2,
                },
                NewTransactionItem {
                    product_id: "missing".to_string(),
                    quantity: 1,
                },
            ],
            discount_kind: DiscountKind::Nominal,
            discount_value: 0,
            tax: 0,
            payment_method: PaymentMethod::Cash,
            paid_amount: 50_000,
            notes: None,
        };
        let err = pos.transactions().create(&cashier, input).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));

        // Nothing persisted: no sale, stock untouched.
        let count = pos
            .database()
            .transactions()
            .count(&TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(count, 0);
        let level = pos.stock().level(&product.id).await.unwrap();
        assert_eq!(level.stock, 10);
    }

    #[tokio::test]
    async fn test_void_restores_stock_with_tagged_movements() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 10).await;
        open_shift(&pos, &cashier).await;

        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 4))
            .await
            .unwrap();
        let voided = pos
            .transactions()
            .void(&admin, &sale.transaction.id, "customer cancelled")
            .await
            .unwrap();

        assert_eq!(voided.status, TransactionStatus::Voided);
        assert_eq!(voided.void_reason.as_deref(), Some("customer cancelled"));
        assert_eq!(voided.voided_by.as_deref(), Some("admin-1"));
        assert!(voided.voided_at.is_some());

        let level = pos.stock().level(&product.id).await.unwrap();
        assert_eq!(level.stock, 10);

        let reference = format!("VOID-{}", sale.transaction.invoice_no);
        let movements = pos
            .database()
            .stock()
            .list_by_reference(&reference)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, StockMovementKind::In);
        assert_eq!(movements[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_double_void_conflicts_without_double_restore() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 10).await;
        open_shift(&pos, &cashier).await;

        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 4))
            .await
            .unwrap();
        pos.transactions()
            .void(&admin, &sale.transaction.id, "first")
            .await
            .unwrap();

        let err = pos
            .transactions()
            .void(&admin, &sale.transaction.id, "second")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));

        // Stock restored exactly once.
        let level = pos.stock().level(&product.id).await.unwrap();
        assert_eq!(level.stock, 10);
        let reference = format!("VOID-{}", sale.transaction.invoice_no);
        let movements = pos
            .database()
            .stock()
            .list_by_reference(&reference)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
    }

    #[tokio::test]
    async fn test_void_requires_admin() {
        let pos = testutil::pos().await;
        let cashier = testutil::cashier("c1");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 10).await;
        open_shift(&pos, &cashier).await;

        let sale = pos
            .transactions()
            .create(&cashier, testutil::cash_sale(&product, 1))
            .await
            .unwrap();
        let err = pos
            .transactions()
            .void(&cashier, &sale.transaction.id, "mine")
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_is_owner_or_admin() {
        let pos = testutil::pos().await;
        let admin = testutil::admin();
        let owner = testutil::cashier("c1");
        let other = testutil::cashier("c2");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 10).await;
        open_shift(&pos, &owner).await;

        let sale = pos
            .transactions()
            .create(&owner, testutil::cash_sale(&product, 1))
            .await
            .unwrap();
        let id = sale.transaction.id;

        assert!(pos.transactions().get(&owner, &id).await.is_ok());
        assert!(pos.transactions().get(&admin, &id).await.is_ok());
        let err = pos.transactions().get(&other, &id).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_list_scopes_non_admins_to_their_own_rows() {
        let pos = testutil::pos().await;
        let c1 = testutil::cashier("c1");
        let c2 = testutil::cashier("c2");
        let product = testutil::seed_product(&pos, "Aqua", 4_000, 50).await;
        open_shift(&pos, &c1).await;
        open_shift(&pos, &c2).await;

        pos.transactions()
            .create(&c1, testutil::cash_sale(&product, 1))
            .await
            .unwrap();
        pos.transactions()
            .create(&c2, testutil::cash_sale(&product, 1))
            .await
            .unwrap();

        // c1 asking for c2's rows still gets only their own.
        let query = TransactionQuery {
            cashier_id: Some("c2".to_string()),
            ..Default::default()
        };
        let page = pos.transactions().list(&c1, &query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].cashier_id, "c1");

        let admin_page = pos
            .transactions()
            .list(&testutil::admin(), &query)
            .await
            .unwrap();
        assert_eq!(admin_page.total, 1);
        assert_eq!(admin_page.data[0].cashier_id, "c2");
    }
}
