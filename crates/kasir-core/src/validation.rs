//! # Validation Module
//!
//! Input validation utilities for Kasir POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (deserialization)                               │
//! │  ├── Type validation (serde)                                           │
//! │  └── Closed enums reject unknown variants                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine service                                               │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (invoice_no, closure_date, open session)       │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use kasir_core::validation::{validate_quantity, validate_positive_amount};
//!
//! // Validate quantity before building a sale item
//! validate_quantity(5).unwrap();
//!
//! // Validate a deposit amount
//! validate_positive_amount("amount", 50_000).unwrap();
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::{MAX_ITEMS_PER_SALE, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that a monetary amount is strictly positive.
///
/// Used for deposits, withdrawals, restock quantities priced in rupiah.
pub fn validate_positive_amount(field: &str, amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that a monetary amount is zero or greater.
///
/// Used for opening/closing cash, tax, set-balance targets.
pub fn validate_non_negative_amount(field: &str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that a signed amount is not zero (manual adjustments).
pub fn validate_non_zero_amount(field: &str, amount: i64) -> ValidationResult<()> {
    if amount == 0 {
        return Err(ValidationError::MustNotBeZero {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a percent discount value (0..=100).
pub fn validate_percent(field: &str, percent: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a void/adjustment reason.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - Maximum 500 characters
///
/// ## Returns
/// The trimmed reason string.
pub fn validate_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        });
    }

    Ok(reason.to_string())
}

/// Validates optional free-text notes.
///
/// ## Rules
/// - Empty/whitespace collapses to None
/// - Maximum 1000 characters
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    match notes {
        None => Ok(None),
        Some(n) => {
            let n = n.trim();
            if n.is_empty() {
                return Ok(None);
            }
            if n.len() > 1000 {
                return Err(ValidationError::TooLong {
                    field: "notes".to_string(),
                    max: 1000,
                });
            }
            Ok(Some(n.to_string()))
        }
    }
}

/// Validates a `yyyy-MM-dd` date string.
///
/// ## Returns
/// The parsed `NaiveDate`.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_date_str;
///
/// assert!(validate_date_str("2025-08-23").is_ok());
/// assert!(validate_date_str("23/08/2025").is_err());
/// ```
pub fn validate_date_str(date: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "must be yyyy-MM-dd".to_string(),
        }
    })
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items in a sale.
///
/// ## Rules
/// - At least one item
/// - Must not exceed MAX_ITEMS_PER_SALE (100)
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_ITEMS_PER_SALE {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ITEMS_PER_SALE as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Pagination
// =============================================================================

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size for list endpoints.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalizes pagination input: page defaults to 1, page size is clamped
/// to 1..=MAX_PAGE_SIZE.
///
/// ## Returns
/// `(page, page_size)` both guaranteed valid.
pub fn normalize_pagination(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_positive_amount("amount", 1).is_ok());
        assert!(validate_positive_amount("amount", 0).is_err());
        assert!(validate_positive_amount("amount", -1).is_err());

        assert!(validate_non_negative_amount("opening cash", 0).is_ok());
        assert!(validate_non_negative_amount("opening cash", -1).is_err());

        assert!(validate_non_zero_amount("amount", -500).is_ok());
        assert!(validate_non_zero_amount("amount", 0).is_err());
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent("discount", 0).is_ok());
        assert!(validate_percent("discount", 100).is_ok());
        assert!(validate_percent("discount", 101).is_err());
        assert!(validate_percent("discount", -5).is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert_eq!(validate_reason("  wrong item  ").unwrap(), "wrong item");
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes(None).unwrap(), None);
        assert_eq!(validate_notes(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_notes(Some(" short note ")).unwrap(),
            Some("short note".to_string())
        );
        assert!(validate_notes(Some(&"x".repeat(1001))).is_err());
    }

    #[test]
    fn test_validate_date_str() {
        assert_eq!(
            validate_date_str("2025-08-23").unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 23).unwrap()
        );
        assert!(validate_date_str("2025-13-01").is_err());
        assert!(validate_date_str("23/08/2025").is_err());
        assert!(validate_date_str("").is_err());
    }

    #[test]
    fn test_validate_item_count() {
        assert!(validate_item_count(1).is_ok());
        assert!(validate_item_count(100).is_ok());
        assert!(validate_item_count(0).is_err());
        assert!(validate_item_count(101).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_normalize_pagination() {
        assert_eq!(normalize_pagination(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(normalize_pagination(Some(3), Some(50)), (3, 50));
        assert_eq!(normalize_pagination(Some(0), Some(0)), (1, 1));
        assert_eq!(
            normalize_pagination(Some(-2), Some(9999)),
            (1, MAX_PAGE_SIZE)
        );
    }
}
