//! # Engine Error Types
//!
//! Business-level error classification for the five services.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validation / Invalid   malformed or out-of-range input        → 400    │
//! │  InvalidState           operation illegal in current state     → 409    │
//! │  Conflict               state precondition violated            → 409    │
//! │  NotFound               referenced entity absent               → 404    │
//! │  Forbidden              caller lacks the required role         → 403    │
//! │  Db                     store failure, detail logged here and  → 500    │
//! │                         collapsed to a generic message upstream         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain-rule violations carry a specific, user-facing reason ("insufficient
//! balance", "no active shift"). Infrastructure failures never leak detail
//! past this crate: the conversion from [`DbError`] logs the underlying cause
//! at `error!` and the API layer renders a generic message.

use thiserror::Error;
use tracing::error;

use kasir_core::{CoreError, ValidationError};
use kasir_db::DbError;

/// Errors surfaced by the engine services.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Structured input validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Message-bearing validation failure (pricing, payment, domain rules).
    ///
    /// ## When This Occurs
    /// - Cash payment below the total
    /// - Withdrawal exceeding the drawer balance
    /// - Explicit stock call on a product that does not track stock
    #[error("{0}")]
    Invalid(String),

    /// The operation is not legal in the aggregate's current state.
    ///
    /// ## When This Occurs
    /// - Creating a sale with no open shift
    #[error("{0}")]
    InvalidState(String),

    /// A state precondition was violated by an earlier or concurrent write.
    ///
    /// ## When This Occurs
    /// - Opening a second shift for the same cashier
    /// - Closing an already-closed business date
    /// - Voiding an already-voided transaction
    #[error("{0}")]
    Conflict(String),

    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Caller's role does not permit the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Store failure. Detail is logged; callers see a generic message.
    #[error("database operation failed")]
    Db(#[source] DbError),
}

impl EngineError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Classify database failures into the engine taxonomy.
///
/// ## Error Mapping
/// ```text
/// DbError::NotFound         → EngineError::NotFound
/// DbError::UniqueViolation  → EngineError::Conflict
/// Other                     → EngineError::Db (cause logged here)
/// ```
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            DbError::UniqueViolation { .. } => EngineError::Conflict(err.to_string()),
            other => {
                error!(error = %other, "database failure");
                EngineError::Db(other)
            }
        }
    }
}

/// Pricing and payment rule failures are caller errors, except where they
/// wrap a structured validation error.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => EngineError::Validation(v),
            other => EngineError::Invalid(other.to_string()),
        }
    }
}

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_keeps_entity_and_id() {
        let err: EngineError = DbError::not_found("transaction", "abc").into();
        match err {
            EngineError::NotFound { entity, id } => {
                assert_eq!(entity, "transaction");
                assert_eq!(id, "abc");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let err: EngineError = DbError::duplicate("closure_date", "2026-08-23").into();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_infrastructure_detail_is_hidden() {
        let err: EngineError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.to_string(), "database operation failed");
    }

    #[test]
    fn test_core_payment_error_is_invalid() {
        let err: EngineError = CoreError::InvalidPayment {
            reason: "insufficient payment: total 20000, paid 15000".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Invalid(_)));
        assert!(err.to_string().contains("insufficient payment"));
    }
}
