//! # Validation Module
//!
//! Cart and field validation for the checkout engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (external collaborator)                        │
//! │  ├── Request parsing, type coercion                                    │
//! │  └── Hands the engine a CheckoutRequest                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business rule validation, before any mutation                     │
//! │  └── Rejections carry no side effects whatsoever                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── CHECK (stock >= 0), CHECK (total_receivables >= 0)                │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::CheckoutRequest;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Checkout Validation
// =============================================================================

/// Validates a checkout request before the atomic scope opens.
///
/// ## Rules
/// - `store_id`, `cashier_id`, `cashier_name` must be present
/// - at least one line item; each with `quantity >= 1` and `unit price >= 0`
/// - `discount >= 0`, `tax >= 0`
/// - computed `total = subtotal − discount + tax` must not be negative
///
/// A request that fails here has attempted no mutation at all.
pub fn validate_checkout(request: &CheckoutRequest) -> ValidationResult<()> {
    validate_required("store_id", &request.store_id)?;
    validate_required("cashier_id", &request.cashier_id)?;
    validate_required("cashier_name", &request.cashier_name)?;

    if request.items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    if request.items.len() > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    for line in &request.items {
        validate_required("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
        validate_price_cents(line.unit_price_cents.cents())?;
    }

    if request.discount_cents.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        });
    }

    if request.tax_cents.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "tax".to_string(),
        });
    }

    let total = request.total();
    if total.is_negative() {
        return Err(ValidationError::NegativeTotal {
            total_cents: total.cents(),
        });
    }

    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a required string field is non-empty after trimming.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (>= 1)
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

/// Validates a unit price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed (free items)
/// - Must not exceed MAX_UNIT_PRICE_CENTS, which keeps every line total
///   (price × quantity) comfortably inside i64
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    if cents > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CartLine, PaymentMethod};

    fn valid_request() -> CheckoutRequest {
        CheckoutRequest {
            store_id: "store-1".to_string(),
            items: vec![CartLine {
                product_id: "prod-1".to_string(),
                quantity: 2,
                unit_price_cents: Money::from_major(3500),
            }],
            payment_method: PaymentMethod::Cash,
            customer_name: None,
            discount_cents: Money::zero(),
            tax_cents: Money::zero(),
            notes: None,
            cashier_id: "cashier-1".to_string(),
            cashier_name: "Admin".to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_checkout(&valid_request()).is_ok());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut req = valid_request();
        req.items.clear();
        assert!(matches!(
            validate_checkout(&req),
            Err(ValidationError::EmptyCart)
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut req = valid_request();
        req.items[0].quantity = 0;
        assert!(matches!(
            validate_checkout(&req),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut req = valid_request();
        req.items[0].unit_price_cents = Money::from_cents(-1);
        assert!(matches!(
            validate_checkout(&req),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_negative_discount_rejected() {
        let mut req = valid_request();
        req.discount_cents = Money::from_cents(-1);
        assert!(matches!(
            validate_checkout(&req),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_discount_exceeding_subtotal_rejected() {
        let mut req = valid_request();
        req.discount_cents = Money::from_major(1_000_000);
        assert!(matches!(
            validate_checkout(&req),
            Err(ValidationError::NegativeTotal { .. })
        ));
    }

    #[test]
    fn test_missing_cashier_rejected() {
        let mut req = valid_request();
        req.cashier_id = "  ".to_string();
        assert!(matches!(
            validate_checkout(&req),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_absurd_price_rejected() {
        let mut req = valid_request();
        req.items[0].unit_price_cents = Money::from_cents(MAX_UNIT_PRICE_CENTS + 1);
        assert!(matches!(
            validate_checkout(&req),
            Err(ValidationError::OutOfRange { .. })
        ));

        assert!(validate_price_cents(MAX_UNIT_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(0).is_ok());
    }
}
