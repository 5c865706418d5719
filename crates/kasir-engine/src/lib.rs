//! # Kasir Engine
//!
//! The transaction, shift, and cash-ledger reconciliation core: five
//! services, each owning one aggregate, composed into the [`Pos`] façade.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Pos                                        │
//! │                                                                         │
//! │   sessions()      SessionService      shift lifecycle                   │
//! │   transactions()  TransactionService  sales + void                      │
//! │   stock()         StockService        product quantity ledger           │
//! │   drawer()        DrawerService       cash balance ledger               │
//! │   closures()      ClosureService      end-of-day reconciliation         │
//! │                                                                         │
//! │   Control flow for a sale:                                              │
//! │                                                                         │
//! │     request ──▶ SessionService (open shift?)                            │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │              TransactionService (price, invoice, persist)               │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │              StockService path (decrement, movement row)                │
//! │                                                                         │
//! │   Day close: TransactionService totals ─▶ ClosureService ─▶ Drawer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//!
//! Every mutating operation runs as ONE database transaction: the state
//! read, the guarded write, the ledger movement, and the audit row commit
//! together or not at all. Guards are expressed in the queries themselves
//! (partial unique index, atomic invoice counter, compare-and-set balance
//! and stock updates), so a lost race surfaces as a zero-row update and a
//! rollback, never as a silently clobbered aggregate.
//!
//! ## Example
//! ```rust,no_run
//! use kasir_db::{Database, DbConfig};
//! use kasir_engine::{Pos, StoreSettings};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DbConfig::in_memory()).await?;
//! let pos = Pos::new(db, StoreSettings::default());
//!
//! let health = pos.database().health_check().await;
//! assert!(health);
//! # Ok(())
//! # }
//! ```

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;

use kasir_core::time::store_offset_from_minutes;
use kasir_core::{Actor, DEFAULT_INVOICE_PREFIX, DEFAULT_STORE_OFFSET_MINUTES};
use kasir_db::Database;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod closure;
pub mod drawer;
pub mod error;
pub mod session;
pub mod stock;
pub mod transaction;

mod audit;

#[cfg(test)]
mod testutil;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use closure::{ClosureService, DayStatus};
pub use drawer::{DrawerService, DrawerSummary};
pub use error::{EngineError, EngineResult};
pub use session::{SessionQuery, SessionService};
pub use stock::StockService;
pub use transaction::{
    NewTransaction, NewTransactionItem, TransactionQuery, TransactionService, TransactionWithItems,
};

// =============================================================================
// Store Settings
// =============================================================================

/// Per-store configuration the engine needs at runtime.
///
/// The local offset is FIXED per store (no DST in the target market) and is
/// the single input to every business-date computation; see
/// [`kasir_core::time::business_date_of`].
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Invoice number prefix, e.g. `INV` in `INV-20260823-0001`.
    pub invoice_prefix: String,
    /// Store-local UTC offset.
    pub store_offset: FixedOffset,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            store_offset: store_offset_from_minutes(DEFAULT_STORE_OFFSET_MINUTES)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl StoreSettings {
    /// Creates settings with an explicit prefix and offset.
    pub fn new(invoice_prefix: impl Into<String>, store_offset: FixedOffset) -> Self {
        StoreSettings {
            invoice_prefix: invoice_prefix.into(),
            store_offset,
        }
    }
}

// =============================================================================
// Pagination Envelope
// =============================================================================

/// One page of a list result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Total matching rows, not just this page.
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    /// Converts the rows while keeping the paging figures.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

// =============================================================================
// Pos Façade
// =============================================================================

/// Entry point to the engine: owns the database handle and store settings,
/// hands out the five services.
#[derive(Debug, Clone)]
pub struct Pos {
    db: Database,
    settings: StoreSettings,
}

impl Pos {
    /// Creates the façade over an already-connected database.
    pub fn new(db: Database, settings: StoreSettings) -> Self {
        Pos { db, settings }
    }

    /// Shift lifecycle operations.
    pub fn sessions(&self) -> SessionService {
        SessionService::new(self.db.clone(), self.settings.clone())
    }

    /// Sale creation, void, and lookup.
    pub fn transactions(&self) -> TransactionService {
        TransactionService::new(self.db.clone(), self.settings.clone())
    }

    /// Product stock ledger operations.
    pub fn stock(&self) -> StockService {
        StockService::new(self.db.clone())
    }

    /// Cash drawer ledger operations.
    pub fn drawer(&self) -> DrawerService {
        DrawerService::new(self.db.clone(), self.settings.clone())
    }

    /// Daily closure operations.
    pub fn closures(&self) -> ClosureService {
        ClosureService::new(self.db.clone(), self.settings.clone())
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The store settings in effect.
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }
}

// =============================================================================
// Role Check
// =============================================================================

/// Rejects non-admin callers of a privileged operation.
pub(crate) fn require_admin(actor: &Actor, operation: &str) -> EngineResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(EngineError::Forbidden(format!(
            "{operation} requires the admin role"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_core::Role;

    #[test]
    fn test_default_settings() {
        let settings = StoreSettings::default();
        assert_eq!(settings.invoice_prefix, "INV");
        assert_eq!(settings.store_offset.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_require_admin() {
        let admin = Actor::new("a1", Role::Admin);
        let cashier = Actor::new("c1", Role::Cashier);

        assert!(require_admin(&admin, "void transaction").is_ok());
        let err = require_admin(&cashier, "void transaction").unwrap_err();
        assert_eq!(
            err.to_string(),
            "void transaction requires the admin role"
        );
    }
}
