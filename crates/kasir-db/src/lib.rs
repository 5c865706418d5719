//! # kasir-db: Database Layer for Kasir POS
//!
//! This crate provides database access for the Kasir POS back end.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (create_transaction)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kasir-engine service ── one business op = one db transaction          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (7 modules)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ SessionRepo   │    │ 001_init.sql │  │   │
//! │  │   │ begin()       │◄───│ TxRepo        │    │ 002_idx.sql  │  │   │
//! │  │   │ Connection    │    │ DrawerRepo …  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (./kasir.db, WAL mode)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (session, transaction, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./kasir.db")).await?;
//!
//! // Pool reads
//! let session = db.sessions().get_by_id("...").await?;
//!
//! // Composed writes: one business op, one transaction
//! let mut tx = db.begin().await?;
//! db.transactions().insert(&mut tx, &sale).await?;
//! db.stock().record_movement(&mut tx, &movement).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditRepository;
pub use repository::closure::ClosureRepository;
pub use repository::drawer::DrawerRepository;
pub use repository::product::ProductRepository;
pub use repository::session::{SessionFilter, SessionRepository};
pub use repository::stock::StockRepository;
pub use repository::transaction::{TransactionFilter, TransactionRepository};
