//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CashierSession  │   │  Transaction    │   │  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  opening_cash   │   │  invoice_no     │   │  stock_before   │       │
//! │  │  expected_cash  │   │  business_date  │   │  stock_after    │       │
//! │  │  difference     │   │  paid/change    │   │  quantity (±)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │CashDrawerMovement│  │  DailyClosure   │   │   AuditEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  balance_before │   │  system totals  │   │  actor/action   │       │
//! │  │  balance_after  │   │  cash_difference│   │  entity ref     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Closed enums: Role, PaymentMethod, DiscountKind, TransactionStatus,   │
//! │  SessionStatus, StockMovementKind, DrawerMovementKind                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ledger Pattern
//! Stock and cash are both ledgers: an append-only movement history whose
//! most recent `*_after` value must always equal the live aggregate
//! (`Product.stock`, `CashDrawerBalance.current_balance`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Actor & Role
// =============================================================================

/// The caller's role, verified upstream by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access: void, daily closure, session listing.
    Admin,
    /// Register operations within the cashier's own shift.
    Cashier,
}

impl Role {
    /// Checks whether the role carries admin privileges.
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "cashier" => Ok(Role::Cashier),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Cashier => write!(f, "cashier"),
        }
    }
}

/// A verified caller identity: who is acting, and with which role.
///
/// Authentication happens upstream; the core never sees credentials, only
/// this pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub actor_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(actor_id: impl Into<String>, role: Role) -> Self {
        Actor {
            actor_id: actor_id.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. Closed set: the register supports exactly these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash. Customer may overpay; change is returned.
    Cash,
    /// QRIS standard QR payment. Always settles at the exact total.
    Qris,
}

impl PaymentMethod {
    /// Cash payments count toward the drawer reconciliation; QRIS does not.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Discount Kind
// =============================================================================

/// How the sale-level discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// The discount value is a literal rupiah amount.
    Nominal,
    /// The discount value is a percentage of the subtotal (0..=100).
    Percent,
}

impl Default for DiscountKind {
    fn default() -> Self {
        DiscountKind::Nominal
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a sale transaction.
///
/// A transaction is created directly in `Completed`; the only transition is
/// the one-way `Completed → Voided`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Sale has been paid and finalized.
    Completed,
    /// Sale was cancelled after completion; stock restored.
    Voided,
}

// =============================================================================
// Session Status
// =============================================================================

/// The status of a cashier shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Shift in progress; the cashier may create transactions.
    Open,
    /// Shift ended and reconciled. Terminal: a session never reopens.
    Closed,
}

// =============================================================================
// Stock Movement Kind
// =============================================================================

/// Why a product's stock changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockMovementKind {
    /// Stock entering: restock, or a void restoring sold quantity.
    In,
    /// Stock leaving: a completed sale.
    Out,
    /// Manual correction (signed) or set-to-value.
    Adjust,
}

// =============================================================================
// Drawer Movement Kind
// =============================================================================

/// Why the cash drawer balance changed.
///
/// `SessionOpen`/`SessionClose` exist in historic data; no current operation
/// emits them (the session lifecycle does not write the drawer ledger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DrawerMovementKind {
    SessionOpen,
    SessionClose,
    /// A day's cash sales deposited by the daily closure.
    SalesIn,
    /// Signed manual correction, or the closure reversal on reopen.
    Adjustment,
    Withdrawal,
    Deposit,
}

// =============================================================================
// Product (consumed catalog entity)
// =============================================================================

/// A product as this core consumes it from the catalog: identity, the
/// authoritative price, and the stock-tracking flags. Catalog CRUD lives
/// elsewhere; the stock ledger owns the `stock` column.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and snapshotted onto sale items.
    pub name: String,

    /// Authoritative unit price in rupiah. Never taken from the caller.
    pub price: i64,

    /// Whether the stock ledger applies to this product.
    /// When false the product has unlimited availability.
    pub track_stock: bool,

    /// Current stock level. Meaningful only when `track_stock` is true.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_rupiah(self.price)
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// One append-only entry in a product's stock ledger.
///
/// Invariant: `stock_after = stock_before + quantity`, and `Product.stock`
/// equals the most recent movement's `stock_after`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub kind: StockMovementKind,
    /// Signed change. Negative for sales, positive for restocks/void restores.
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    /// Links the movement to its origin, e.g. an invoice number or
    /// `VOID-{invoice_no}`.
    pub reference: Option<String>,
    pub actor_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cashier Session (shift)
// =============================================================================

/// A cashier shift: the bounded period during which one cashier may create
/// transactions. At most one `Open` session exists per cashier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashierSession {
    pub id: String,
    pub cashier_id: String,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,

    /// Float placed in the drawer at shift start.
    pub opening_cash: i64,
    /// Physically counted cash at shift end.
    pub closing_cash: Option<i64>,
    /// `opening_cash + cash_total`, computed at shift end.
    pub expected_cash: Option<i64>,
    /// `closing_cash - expected_cash`; negative means a shortfall.
    pub difference: Option<i64>,

    /// Aggregates. Live while Open (recomputed from transactions); frozen
    /// at the values current when the shift ended.
    pub total_sales: i64,
    pub cash_total: i64,
    pub non_cash_total: i64,
    pub transaction_count: i64,

    pub status: SessionStatus,
    pub notes: Option<String>,
}

impl CashierSession {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// Live totals for a session, summed from its Completed transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SessionTotals {
    pub total_sales: i64,
    pub cash_total: i64,
    pub non_cash_total: i64,
    pub transaction_count: i64,
}

// =============================================================================
// Transaction (sale)
// =============================================================================

/// A completed (or later voided) sale.
///
/// A transaction cannot exist without an owning Open session at creation
/// time. Item prices are snapshots from the catalog; the caller never
/// supplies a price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    /// Unique, format `{prefix}-{yyyyMMdd}-{0001}` per business date.
    pub invoice_no: String,
    pub cashier_id: String,
    pub session_id: String,
    /// Calendar day in store-local time, not the raw creation date.
    #[ts(as = "String")]
    pub business_date: NaiveDate,

    pub subtotal: i64,
    pub discount_amount: i64,
    pub tax: i64,
    /// `subtotal - discount_amount + tax`.
    pub total: i64,

    pub payment_method: PaymentMethod,
    pub paid_amount: i64,
    pub change_amount: i64,

    pub status: TransactionStatus,
    pub void_reason: Option<String>,
    pub voided_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub voided_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Only `Completed` transactions can be voided.
    #[inline]
    pub fn is_voidable(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item in a transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in rupiah at time of sale (frozen, from the catalog).
    pub unit_price: i64,
    pub quantity: i64,
    /// `unit_price × quantity`.
    pub line_total: i64,
}

impl TransactionItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_rupiah(self.unit_price)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_rupiah(self.line_total)
    }
}

// =============================================================================
// Cash Drawer
// =============================================================================

/// The singleton store-wide cash balance. Lazily created at zero.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashDrawerBalance {
    /// Always 1; the table holds a single row.
    pub id: i64,
    pub current_balance: i64,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
}

/// One append-only entry in the cash drawer ledger.
///
/// Invariant: `balance_after = balance_before + amount`, and the singleton
/// balance equals the most recent movement's `balance_after`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashDrawerMovement {
    pub id: String,
    pub kind: DrawerMovementKind,
    /// Signed. Deposits positive, withdrawals negative.
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    /// Links the movement to its origin, e.g. a DailyClosure id.
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub actor_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// System-computed sales figures for one business date, summed from its
/// `Completed` transactions. Source data for a daily closure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DaySalesSummary {
    pub cash_total: i64,
    pub qris_total: i64,
    pub total_sales: i64,
    pub transaction_count: i64,
    #[ts(as = "Option<String>")]
    pub first_transaction_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub last_transaction_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Daily Closure
// =============================================================================

/// The once-per-day reconciliation record: system-computed totals for a
/// business date against the physically counted cash.
///
/// Creating one is a write barrier for the date; deleting it (reopen-day)
/// must be compensated in the drawer ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailyClosure {
    pub id: String,
    /// One closure per calendar day (unique).
    #[ts(as = "String")]
    pub closure_date: NaiveDate,
    pub closed_by: String,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,

    pub system_cash_total: i64,
    pub system_qris_total: i64,
    pub system_total_sales: i64,
    pub total_transactions: i64,

    /// Cash physically counted at close.
    pub physical_cash_count: i64,
    /// `physical_cash_count - system_cash_total`.
    pub cash_difference: i64,

    #[ts(as = "Option<String>")]
    pub first_transaction_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub last_transaction_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,
}

// =============================================================================
// Audit Entry
// =============================================================================

/// Append-only record of a state-changing operation, written in the same
/// transaction as the change itself. Display/reporting is out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AuditEntry {
    pub id: String,
    pub actor_id: String,
    /// Machine-readable action name, e.g. "transaction.void".
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    /// Optional JSON payload with operation specifics.
    pub detail: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Cashier".parse::<Role>().unwrap(), Role::Cashier);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_admin_check() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Cashier.is_admin());
    }

    #[test]
    fn test_payment_method_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Qris).unwrap(),
            "\"qris\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cash).unwrap(),
            "\"cash\""
        );
    }

    #[test]
    fn test_drawer_kind_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&DrawerMovementKind::SalesIn).unwrap(),
            "\"sales_in\""
        );
    }

    #[test]
    fn test_discount_kind_default() {
        assert_eq!(DiscountKind::default(), DiscountKind::Nominal);
    }

    #[test]
    fn test_transaction_voidable() {
        let now = Utc::now();
        let mut tx = Transaction {
            id: "t1".into(),
            invoice_no: "INV-20250101-0001".into(),
            cashier_id: "c1".into(),
            session_id: "s1".into(),
            business_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            subtotal: 20_000,
            discount_amount: 0,
            tax: 0,
            total: 20_000,
            payment_method: PaymentMethod::Cash,
            paid_amount: 20_000,
            change_amount: 0,
            status: TransactionStatus::Completed,
            void_reason: None,
            voided_by: None,
            voided_at: None,
            notes: None,
            created_at: now,
        };
        assert!(tx.is_voidable());
        tx.status = TransactionStatus::Voided;
        assert!(!tx.is_voidable());
    }
}
