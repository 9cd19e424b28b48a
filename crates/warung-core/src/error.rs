//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  warung-core errors (this file)                                        │
//! │  └── ValidationError  - Malformed input, no mutation attempted         │
//! │                                                                         │
//! │  warung-db errors (separate crate)                                     │
//! │  ├── DbError          - Storage failures                               │
//! │  └── CheckoutError    - The caller-facing checkout taxonomy            │
//! │                                                                         │
//! │  warung-sync errors (separate crate)                                   │
//! │  └── RelayError       - Logged at warn, never propagated to checkout   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, shortfall, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur before any mutation is attempted; a request that fails
/// validation never touches storage.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The cart has no line items.
    #[error("at least one line item is required")]
    EmptyCart,

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Grand total went below zero after discount/tax.
    #[error("total must not be negative (computed {total_cents} cents)")]
    NegativeTotal { total_cents: i64 },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "cashier_id".to_string(),
        };
        assert_eq!(err.to_string(), "cashier_id is required");

        let err = ValidationError::NegativeTotal { total_cents: -500 };
        assert_eq!(
            err.to_string(),
            "total must not be negative (computed -500 cents)"
        );

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }
}
