//! # Pricing Module
//!
//! Pure sale math: line totals, sale-level discount, tax, and payment
//! settlement. No I/O; the engine resolves catalog prices and feeds them in
//! as already-priced lines.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  catalog price ──► PricedLine {unit_price, quantity}                    │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  subtotal = Σ unit_price × quantity                                     │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  discount_amount = value            (Nominal, clamped to subtotal)     │
//! │                  = subtotal × pct%  (Percent, 0..=100, half-up)        │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  total = subtotal − discount_amount + tax                              │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  settle_payment:  Cash  → paid ≥ total, change = paid − total          │
//! │                   QRIS  → paid := total, change = 0                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountKind, PaymentMethod};
use crate::validation::{
    validate_item_count, validate_non_negative_amount, validate_percent, validate_quantity,
};

// =============================================================================
// Priced Line
// =============================================================================

/// An item line with its price already resolved from the catalog.
///
/// The caller never supplies a price; the engine builds these from Product
/// rows so the snapshot taken here is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Money,
    pub quantity: i64,
}

impl PricedLine {
    pub const fn new(unit_price: Money, quantity: i64) -> Self {
        PricedLine {
            unit_price,
            quantity,
        }
    }

    /// `unit_price × quantity`.
    #[inline]
    pub const fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// The four monetary components of a priced sale.
///
/// Invariant: `total = subtotal − discount_amount + tax`, and
/// `discount_amount ≤ subtotal` (a nominal discount larger than the
/// subtotal is clamped, so `total` never goes negative from discounting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Prices a sale from its lines and the sale-level discount/tax inputs.
///
/// ## Errors
/// - `EmptySale` / too many items (via item count validation)
/// - quantity out of range on any line
/// - negative nominal discount or tax
/// - percent discount outside 0..=100
pub fn compute_totals(
    lines: &[PricedLine],
    discount_kind: DiscountKind,
    discount_value: i64,
    tax: i64,
) -> CoreResult<SaleTotals> {
    if lines.is_empty() {
        return Err(CoreError::EmptySale);
    }
    validate_item_count(lines.len())?;

    for line in lines {
        validate_quantity(line.quantity)?;
    }

    let subtotal: Money = lines.iter().map(PricedLine::line_total).sum();

    let discount_amount = match discount_kind {
        DiscountKind::Nominal => {
            validate_non_negative_amount("discount", discount_value)?;
            // A voucher larger than the purchase discounts the purchase, not more.
            Money::from_rupiah(discount_value).min(subtotal)
        }
        DiscountKind::Percent => {
            validate_percent("discount", discount_value)?;
            subtotal.percent_of(discount_value)
        }
    };

    validate_non_negative_amount("tax", tax)?;
    let tax = Money::from_rupiah(tax);

    let total = subtotal - discount_amount + tax;

    Ok(SaleTotals {
        subtotal,
        discount_amount,
        tax,
        total,
    })
}

// =============================================================================
// Payment Settlement
// =============================================================================

/// The settled payment figures stored on the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settlement {
    pub paid_amount: Money,
    pub change_amount: Money,
}

/// Applies the payment method's settlement rule.
///
/// - **Cash**: requires `paid ≥ total`; change is returned.
/// - **QRIS**: settles at exactly the total. The caller's `paid` input is
///   normalized, not rejected; QR payments cannot overpay.
///
/// ## Example
/// ```rust
/// use kasir_core::money::Money;
/// use kasir_core::pricing::settle_payment;
/// use kasir_core::types::PaymentMethod;
///
/// let s = settle_payment(
///     PaymentMethod::Cash,
///     Money::from_rupiah(20_000),
///     Money::from_rupiah(50_000),
/// )
/// .unwrap();
/// assert_eq!(s.change_amount.rupiah(), 30_000);
/// ```
pub fn settle_payment(
    method: PaymentMethod,
    total: Money,
    paid_amount: Money,
) -> CoreResult<Settlement> {
    if paid_amount.is_negative() {
        return Err(CoreError::InvalidPayment {
            reason: "paid amount must not be negative".to_string(),
        });
    }

    match method {
        PaymentMethod::Cash => {
            if paid_amount < total {
                return Err(CoreError::InvalidPayment {
                    reason: format!(
                        "insufficient payment: total {}, paid {}",
                        total.rupiah(),
                        paid_amount.rupiah()
                    ),
                });
            }
            Ok(Settlement {
                paid_amount,
                change_amount: paid_amount - total,
            })
        }
        PaymentMethod::Qris => Ok(Settlement {
            paid_amount: total,
            change_amount: Money::zero(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
