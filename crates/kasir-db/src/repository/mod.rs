//! # Repository Module
//!
//! Database repository implementations for Kasir POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine Service                                                        │
//! │       │                                                                 │
//! │       │  db.transactions().get_by_id("...")                            │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                 │
//! │  ├── get_by_id(&self, id)             ← reads the pool                 │
//! │  ├── list(&self, filter, ...)         ← reads the pool                 │
//! │  ├── insert(&self, conn, tx)          ← writes a connection            │
//! │  └── mark_voided(&self, conn, ...)    ← writes a connection            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read/Write Convention
//!
//! - `get_*` / `list_*` / `count_*` methods read from the pool. Use them for
//!   standalone queries (list endpoints, lookups outside a write flow).
//! - `fetch_*` methods and all mutations take `&mut SqliteConnection`. A
//!   service begins one transaction and threads `&mut *tx` through every
//!   call, so the reads a decision is based on and the writes that follow
//!   share one consistent snapshot and commit atomically.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog lookups and stock column updates
//! - [`stock::StockRepository`] - Stock movement ledger
//! - [`session::SessionRepository`] - Cashier shift lifecycle
//! - [`transaction::TransactionRepository`] - Sales, items, invoice counters
//! - [`drawer::DrawerRepository`] - Cash drawer balance and ledger
//! - [`closure::ClosureRepository`] - Daily closure records
//! - [`audit::AuditRepository`] - Append-only audit trail

pub mod audit;
pub mod closure;
pub mod drawer;
pub mod product;
pub mod session;
pub mod stock;
pub mod transaction;
