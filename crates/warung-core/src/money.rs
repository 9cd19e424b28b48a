//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Checkout math must reconcile exactly:                                  │
//! │    subtotal = Σ(quantity × unit price)                                  │
//! │    total    = subtotal − discount + tax                                 │
//! │                                                                         │
//! │  OUR SOLUTION: i64 minor units (cents). Every monetary value in the    │
//! │  system flows through this type; only display code formats rupiah.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediates (total = subtotal − discount + tax
///   is validated afterwards, not silently clamped)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole major units (rupiah).
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let price = Money::from_major(3500); // Rp 3.500
    /// assert_eq!(price.cents(), 350000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// Validation caps unit prices and quantities well below the point where
    /// saturation could trigger; the saturating arithmetic is the backstop
    /// that keeps pathological inputs from panicking in debug builds.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let unit_price = Money::from_major(3500);
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total, Money::from_major(7000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Formats the amount in the rupiah display convention used on receipts:
    /// `Rp` prefix, major units grouped with dots, minor units appended only
    /// when non-zero (IDR has no circulating sub-unit).
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(9500).format_idr(), "Rp 9.500");
    /// assert_eq!(Money::from_cents(950050).format_idr(), "Rp 9.500,50");
    /// ```
    pub fn format_idr(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let grouped = group_thousands(self.major().unsigned_abs());

        if self.minor() == 0 {
            format!("{}Rp {}", sign, grouped)
        } else {
            format!("{}Rp {},{:02}", sign, grouped, self.minor())
        }
    }
}

/// Inserts a dot every three digits, right to left: 1234567 → "1.234.567".
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    let first_group = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - first_group) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the rupiah receipt format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_idr())
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

/// Multiplication by i64 (for quantity calculations). Saturates like
/// [`Money::multiply_quantity`].
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_and_parts() {
        let money = Money::from_major(3500);
        assert_eq!(money.cents(), 350000);
        assert_eq!(money.major(), 3500);
        assert_eq!(money.minor(), 0);

        let with_minor = Money::from_cents(350075);
        assert_eq!(with_minor.major(), 3500);
        assert_eq!(with_minor.minor(), 75);
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = Money::from_major(3500);
        let b = Money::from_major(2500);

        assert_eq!((a + b).cents(), 600000);
        assert_eq!((a - b).cents(), 100000);
        assert_eq!((a * 2).cents(), 700000);
    }

    #[test]
    fn test_checkout_totals_reconcile() {
        // The receipt scenario: 2 × 3.500 + 1 × 2.500 = 9.500 exactly.
        let subtotal =
            Money::from_major(3500).multiply_quantity(2) + Money::from_major(2500).multiply_quantity(1);
        assert_eq!(subtotal, Money::from_major(9500));

        let total = subtotal - Money::zero() + Money::zero();
        assert_eq!(total, Money::from_major(9500));
    }

    #[test]
    fn test_format_idr() {
        assert_eq!(Money::from_major(9500).format_idr(), "Rp 9.500");
        assert_eq!(Money::from_major(1250000).format_idr(), "Rp 1.250.000");
        assert_eq!(Money::from_major(0).format_idr(), "Rp 0");
        assert_eq!(Money::from_major(100).format_idr(), "Rp 100");
        assert_eq!(Money::from_cents(950050).format_idr(), "Rp 9.500,50");
        assert_eq!(Money::from_major(-9500).format_idr(), "-Rp 9.500");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1.000");
        assert_eq!(group_thousands(1234567), "1.234.567");
    }

    #[test]
    fn test_multiply_saturates_instead_of_panicking() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(999), Money::from_cents(i64::MAX));
        assert_eq!(huge * 999, Money::from_cents(i64::MAX));

        let huge_negative = Money::from_cents(i64::MIN / 2);
        assert_eq!(
            huge_negative.multiply_quantity(999),
            Money::from_cents(i64::MIN)
        );
    }

    #[test]
    fn test_negative_checks() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(Money::zero().is_zero());
    }
}
