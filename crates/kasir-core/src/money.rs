//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    Rp10.000 / 3 = Rp3.333 (×3 = Rp9.999)  → Lost Rp1!                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah                                           │
//! │    10000 / 3 = 3333 (×3 = 9999)                                        │
//! │    We KNOW we lost Rp1, and handle it explicitly                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rupiah has no minor unit in day-to-day retail, so the smallest currency
//! unit is one rupiah and every amount in the system is a plain `i64`.
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! // Create from whole rupiah (the only constructor)
//! let price = Money::from_rupiah(20_000); // Rp20.000
//!
//! // Arithmetic operations
//! let doubled = price * 2;                      // Rp40.000
//! let total = price + Money::from_rupiah(5_000); // Rp25.000
//!
//! // NEVER do this:
//! // let bad = Money::from_float(19999.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for shortfalls, adjustments,
///   and compensating ledger entries
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► item snapshot ──► line total ──► sale subtotal      │
/// │                                                                         │
/// │  subtotal ──► discount ──► tax ──► total ──► paid/change               │
/// │                                                                         │
/// │  opening cash ──► expected cash ──► difference (shift reconciliation)  │
/// │                                                                         │
/// │  drawer balance ──► movement amount ──► balance_after (cash ledger)    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let price = Money::from_rupiah(20_000); // Rp20.000
    /// assert_eq!(price.rupiah(), 20_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let zero = Money::zero();
    /// assert_eq!(zero.rupiah(), 0);
    /// assert!(zero.is_zero());
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let shortfall = Money::from_rupiah(-5_000);
    /// assert_eq!(shortfall.abs().rupiah(), 5_000);
    /// ```
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two values.
    #[inline]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Calculates a percentage of this amount, rounded half-up.
    ///
    /// Used for percent discounts: `Rp20.000 at 15% = Rp3.000`.
    ///
    /// ## Implementation
    /// Integer math via i128: `(amount * percent + 50) / 100`.
    /// The +50 provides rounding (50/100 = 0.5). i128 keeps the intermediate
    /// product from overflowing on large subtotals.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let subtotal = Money::from_rupiah(20_000);
    /// assert_eq!(subtotal.percent_of(15).rupiah(), 3_000);
    ///
    /// // Rp999 at 15% = Rp149.85 → rounds to Rp150
    /// assert_eq!(Money::from_rupiah(999).percent_of(15).rupiah(), 150);
    /// ```
    pub fn percent_of(&self, percent: i64) -> Money {
        let amount = (self.0 as i128 * percent as i128 + 50) / 100;
        Money::from_rupiah(amount as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(3_500); // Rp3.500
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.rupiah(), 10_500); // Rp10.500
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in the local `Rp1.234.567` format.
///
/// ## Note
/// This is for logs and debugging. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.abs().to_string();

        // Group digits in threes from the right: 1234567 -> 1.234.567
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        write!(f, "{}Rp{}", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (for subtotals over line items).
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupiah() {
        let money = Money::from_rupiah(20_000);
        assert_eq!(money.rupiah(), 20_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_rupiah(500)), "Rp500");
        assert_eq!(format!("{}", Money::from_rupiah(20_000)), "Rp20.000");
        assert_eq!(format!("{}", Money::from_rupiah(1_234_567)), "Rp1.234.567");
        assert_eq!(format!("{}", Money::from_rupiah(-5_000)), "-Rp5.000");
        assert_eq!(format!("{}", Money::from_rupiah(0)), "Rp0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(10_000);
        let b = Money::from_rupiah(5_000);

        assert_eq!((a + b).rupiah(), 15_000);
        assert_eq!((a - b).rupiah(), 5_000);
        let result: Money = a * 3;
        assert_eq!(result.rupiah(), 30_000);
    }

    #[test]
    fn test_percent_basic() {
        // Rp20.000 at 10% = Rp2.000
        let subtotal = Money::from_rupiah(20_000);
        assert_eq!(subtotal.percent_of(10).rupiah(), 2_000);
    }

    #[test]
    fn test_percent_with_rounding() {
        // Rp999 at 15% = Rp149.85 → Rp150 (half-up)
        assert_eq!(Money::from_rupiah(999).percent_of(15).rupiah(), 150);
        // Rp333 at 50% = Rp166.5 → Rp167
        assert_eq!(Money::from_rupiah(333).percent_of(50).rupiah(), 167);
    }

    #[test]
    fn test_percent_boundaries() {
        let subtotal = Money::from_rupiah(20_000);
        assert_eq!(subtotal.percent_of(0).rupiah(), 0);
        assert_eq!(subtotal.percent_of(100).rupiah(), 20_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_rupiah(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_rupiah(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_rupiah(3_500);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.rupiah(), 10_500);
    }

    #[test]
    fn test_min() {
        let a = Money::from_rupiah(10_000);
        let b = Money::from_rupiah(5_000);
        assert_eq!(a.min(b), b);
        assert_eq!(b.min(a), b);
    }

    #[test]
    fn test_sum() {
        let lines = [
            Money::from_rupiah(20_000),
            Money::from_rupiah(3_500),
            Money::from_rupiah(1_500),
        ];
        let subtotal: Money = lines.into_iter().sum();
        assert_eq!(subtotal.rupiah(), 25_000);
    }

    /// Rp10.000 split 3 ways loses Rp1; the loss is explicit integer math,
    /// never a floating point artifact.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_thousand = Money::from_rupiah(10_000);
        let one_third = Money::from_rupiah(10_000 / 3); // 3333
        let reconstructed: Money = one_third * 3; // 9999

        assert_eq!(reconstructed.rupiah(), 9_999);
        let lost = ten_thousand - reconstructed;
        assert_eq!(lost.rupiah(), 1);
    }
}
