//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate is the **heart** of Kasir POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                       │   │
//! │  │    sessions ──► transactions ──► drawer ──► daily closure       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kasir-engine (state machines)                   │   │
//! │  │    shift lifecycle, sale creation/void, cash ledger, closure    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │   time    │  │   │
//! │  │   │  Session  │  │   Money   │  │  totals   │  │ business  │  │   │
//! │  │   │  Ledgers  │  │  (rupiah) │  │settlement │  │   date    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CashierSession, Transaction, ledgers, enums)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Sale totals and Cash/QRIS payment settlement
//! - [`time`] - Business-date math and the invoice number format
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole rupiah (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::money::Money;
//! use kasir_core::pricing::{compute_totals, settle_payment, PricedLine};
//! use kasir_core::types::{DiscountKind, PaymentMethod};
//!
//! // One item at Rp20.000, no discount, no tax
//! let lines = [PricedLine::new(Money::from_rupiah(20_000), 1)];
//! let totals = compute_totals(&lines, DiscountKind::Nominal, 0, 0).unwrap();
//! assert_eq!(totals.total.rupiah(), 20_000);
//!
//! // Paid with a Rp50.000 note
//! let s = settle_payment(PaymentMethod::Cash, totals.total, Money::from_rupiah(50_000)).unwrap();
//! assert_eq!(s.change_amount.rupiah(), 30_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod time;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kasir_core::Money` instead of
// `use kasir_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PricedLine, SaleTotals, Settlement};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_ITEMS_PER_SALE: usize = 100;

/// Maximum quantity of a single item in a sale
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Configurable per-store in future versions.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default invoice number prefix when no override is configured.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Default store-local UTC offset in minutes (+7h, Western Indonesia Time).
pub const DEFAULT_STORE_OFFSET_MINUTES: i32 = 420;
