//! # Domain Types
//!
//! Core domain types used throughout Warung POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  txn_number     │   │  name           │       │
//! │  │  stock ≥ 0      │   │  items[] (JSON) │   │  receivables    │       │
//! │  │  price_sell     │   │  totals, status │   │  spent / count  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   LineItem      │   │  LedgerEntry    │   │ PaymentMethod   │       │
//! │  │  (snapshot)     │   │  (append-only)  │   │ PaymentStatus   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, transaction_number) - human-readable, unique per scope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Sentinel customer name meaning "no specific customer".
///
/// Excluded from customer resolution: a transaction carrying this name is
/// never linked to a customer row.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. `Receivables` is store credit, not an external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Bank transfer.
    Transfer,
    /// QRIS standard QR payment.
    Qris,
    /// Store-extended credit, tracked in the receivables ledger.
    Receivables,
}

impl PaymentMethod {
    /// Wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Receivables => "receivables",
        }
    }

    /// Receipt label (Indonesian, matching the printed receipts).
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Tunai",
            PaymentMethod::Transfer => "Transfer Bank",
            PaymentMethod::Qris => "QRIS",
            PaymentMethod::Receivables => "Piutang",
        }
    }

    /// The payment status a fresh transaction starts in.
    ///
    /// Receivables start pending (customer still owes the amount), every other
    /// method is settled at the till.
    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Receivables => PaymentStatus::Pending,
            _ => PaymentStatus::Paid,
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            "qris" => Ok(PaymentMethod::Qris),
            "receivables" => Ok(PaymentMethod::Receivables),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Settlement state of a transaction.
///
/// Created as `Pending` (receivables) or `Paid` (everything else). The
/// pending → paid/cancelled transition is a reserved extension point; nothing
/// in the checkout path drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting settlement (receivables transactions start here).
    Pending,
    /// Fully settled.
    Paid,
    /// Cancelled/voided.
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// Receipt label (Indonesian).
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Lunas",
            PaymentStatus::Cancelled => "Dibatalkan",
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Stock is mutated only through the inventory store's reserve/increase
/// operations; `stock >= 0` holds at all times, even under concurrent
/// checkouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store (tenant) this product belongs to.
    pub store_id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Stock Keeping Unit - business identifier, unique per store.
    pub sku: String,

    /// Cost price in cents.
    pub price_cents: Money,

    /// Sell price in cents.
    pub price_sell_cents: Money,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Unit label ("pcs", "kg", ...).
    pub unit: String,

    /// Optional catalog category.
    pub category: Option<String>,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Optional product image URL.
    pub image_url: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// Document id assigned by the secondary store, for correlation.
    pub mirror_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sell price as Money.
    #[inline]
    pub fn sell_price(&self) -> Money {
        self.price_sell_cents
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }

    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock <= threshold
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A known customer of the store.
///
/// Aggregate invariants maintained by the checkout orchestrator:
/// - `total_receivables` equals the signed sum of all ledger entries
/// - `total_spent` / `total_transactions` equal the aggregate of the
///   customer's transactions with payment status `paid`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,

    /// Running receivables balance in cents. Never negative.
    pub total_receivables_cents: Money,

    /// Lifetime paid-transaction spend in cents.
    pub total_spent_cents: Money,

    /// Count of paid transactions.
    pub total_transactions: i64,

    pub notes: Option<String>,
    pub is_active: bool,

    /// Document id assigned by the secondary store.
    pub mirror_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn has_receivables(&self) -> bool {
        self.total_receivables_cents.cents() > 0
    }
}

// =============================================================================
// Line Item (snapshot)
// =============================================================================

/// A line item in a transaction.
///
/// Uses the snapshot pattern: product name, unit and price are frozen at
/// checkout time so the transaction stays meaningful even if the catalog
/// entry later changes. Stored as a JSON column on the transaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Quantity sold. Always >= 1.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: Money,
    /// Line total (unit_price × quantity).
    pub line_total_cents: Money,
    /// Unit label at time of sale (frozen).
    pub unit: String,
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed checkout.
///
/// Created exactly once by the orchestrator and immutable thereafter, except
/// for the reserved status transition and the `mirror_id` linkage set by the
/// replication relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub store_id: String,

    /// Unique human-readable identifier, e.g. `TRX20260830A1B2C3`.
    pub transaction_number: String,

    /// Linked customer, if the cart named one that resolved.
    pub customer_id: Option<String>,

    /// Denormalized display name ("Walk-in Customer" when none given).
    pub customer_name: String,

    /// Immutable ordered snapshot of what was sold.
    pub items: Vec<LineItem>,

    pub subtotal_cents: Money,
    pub discount_cents: Money,
    pub tax_cents: Money,

    /// subtotal − discount + tax. Never negative.
    pub total_cents: Money,

    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,

    pub notes: String,
    pub cashier_id: String,
    pub cashier_name: String,

    /// Document id assigned by the secondary store.
    pub mirror_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Number of distinct line items.
    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all line items.
    pub fn total_items_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Receipt-formatted grand total, e.g. `Rp 9.500`.
    pub fn formatted_total(&self) -> String {
        self.total_cents.format_idr()
    }
}

// =============================================================================
// Receivables Ledger Entry
// =============================================================================

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
    /// Credit extended to the customer (balance goes up).
    Add,
    /// Credit repaid (balance goes down, clamped at zero).
    Subtract,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Add => "add",
            LedgerEntryType::Subtract => "subtract",
        }
    }

    /// Applies this entry to a balance.
    ///
    /// `Subtract` clamps at zero: repaying more than is owed never produces a
    /// negative balance, matching the running-balance invariant.
    pub fn apply(&self, previous: Money, amount: Money) -> Money {
        match self {
            LedgerEntryType::Add => previous + amount,
            LedgerEntryType::Subtract => {
                let next = previous - amount;
                if next.is_negative() {
                    Money::zero()
                } else {
                    next
                }
            }
        }
    }
}

/// An append-only receivables log entry.
///
/// Never mutated or deleted; exists purely as an audit trail. The customer's
/// `total_receivables` always equals the latest entry's `new_balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: String,
    pub store_id: String,
    pub customer_id: String,
    pub entry_type: LedgerEntryType,
    pub amount_cents: Money,
    pub previous_balance_cents: Money,
    pub new_balance_cents: Money,
    /// The transaction this entry logs, when there is one.
    pub transaction_id: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Checkout Request
// =============================================================================

/// One requested cart line, as handed over by the (external) HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: Money,
}

impl CartLine {
    /// quantity × unit price, exact integer arithmetic.
    pub fn line_total(&self) -> Money {
        self.unit_price_cents.multiply_quantity(self.quantity)
    }
}

/// A validated cart ready for the checkout orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub store_id: String,
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub discount_cents: Money,
    #[serde(default)]
    pub tax_cents: Money,
    pub notes: Option<String>,
    pub cashier_id: String,
    pub cashier_name: String,
}

impl CheckoutRequest {
    /// Σ(quantity × unit price) across the cart.
    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }

    /// subtotal − discount + tax. May be negative; validation rejects that.
    pub fn total(&self) -> Money {
        self.subtotal() - self.discount_cents + self.tax_cents
    }

    /// The display name to denormalize onto the transaction.
    pub fn display_customer_name(&self) -> &str {
        self.customer_name.as_deref().unwrap_or(WALK_IN_CUSTOMER)
    }

    /// Whether `customer_name` should be resolved against the customer table.
    ///
    /// The walk-in sentinel and an absent name both mean "customer-less".
    pub fn wants_customer_resolution(&self) -> bool {
        matches!(&self.customer_name, Some(name) if name != WALK_IN_CUSTOMER)
    }
}

// =============================================================================
// Receipt (response shape)
// =============================================================================

/// The transaction shape returned to the checkout caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: String,
    pub transaction_number: String,
    pub customer_name: String,
    pub total_amount_cents: Money,
    pub payment_method: PaymentMethod,
    pub payment_method_label: String,
    pub payment_status: PaymentStatus,
    pub payment_status_label: String,
    pub items: Vec<LineItem>,
    pub items_count: usize,
    pub formatted_total: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Transaction> for Receipt {
    fn from(txn: &Transaction) -> Self {
        Receipt {
            id: txn.id.clone(),
            transaction_number: txn.transaction_number.clone(),
            customer_name: txn.customer_name.clone(),
            total_amount_cents: txn.total_cents,
            payment_method: txn.payment_method,
            payment_method_label: txn.payment_method.label().to_string(),
            payment_status: txn.payment_status,
            payment_status_label: txn.payment_status.label().to_string(),
            items: txn.items.clone(),
            items_count: txn.items_count(),
            formatted_total: txn.formatted_total(),
            created_at: txn.created_at,
            updated_at: txn.updated_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(items: Vec<CartLine>) -> CheckoutRequest {
        CheckoutRequest {
            store_id: "store-1".to_string(),
            items,
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
    fn test_initial_status_per_method() {
        assert_eq!(PaymentMethod::Cash.initial_status(), PaymentStatus::Paid);
        assert_eq!(PaymentMethod::Transfer.initial_status(), PaymentStatus::Paid);
        assert_eq!(PaymentMethod::Qris.initial_status(), PaymentStatus::Paid);
        assert_eq!(
            PaymentMethod::Receivables.initial_status(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_payment_labels() {
        assert_eq!(PaymentMethod::Cash.label(), "Tunai");
        assert_eq!(PaymentMethod::Receivables.label(), "Piutang");
        assert_eq!(PaymentStatus::Paid.label(), "Lunas");
        assert_eq!(PaymentStatus::Cancelled.label(), "Dibatalkan");
    }

    #[test]
    fn test_checkout_request_totals() {
        let req = request(vec![
            CartLine {
                product_id: "a".to_string(),
                quantity: 2,
                unit_price_cents: Money::from_major(3500),
            },
            CartLine {
                product_id: "b".to_string(),
                quantity: 1,
                unit_price_cents: Money::from_major(2500),
            },
        ]);

        assert_eq!(req.subtotal(), Money::from_major(9500));
        assert_eq!(req.total(), Money::from_major(9500));
    }

    #[test]
    fn test_discount_and_tax_enter_total() {
        let mut req = request(vec![CartLine {
            product_id: "a".to_string(),
            quantity: 1,
            unit_price_cents: Money::from_major(10000),
        }]);
        req.discount_cents = Money::from_major(1000);
        req.tax_cents = Money::from_major(500);

        assert_eq!(req.subtotal(), Money::from_major(10000));
        assert_eq!(req.total(), Money::from_major(9500));
    }

    #[test]
    fn test_walk_in_sentinel_skips_resolution() {
        let mut req = request(vec![]);
        assert!(!req.wants_customer_resolution());
        assert_eq!(req.display_customer_name(), WALK_IN_CUSTOMER);

        req.customer_name = Some(WALK_IN_CUSTOMER.to_string());
        assert!(!req.wants_customer_resolution());

        req.customer_name = Some("Budi Santoso".to_string());
        assert!(req.wants_customer_resolution());
        assert_eq!(req.display_customer_name(), "Budi Santoso");
    }

    #[test]
    fn test_ledger_apply() {
        let prev = Money::from_major(5000);
        let amount = Money::from_major(9500);

        assert_eq!(
            LedgerEntryType::Add.apply(prev, amount),
            Money::from_major(14500)
        );
        // Subtract clamps at zero.
        assert_eq!(
            LedgerEntryType::Subtract.apply(prev, amount),
            Money::zero()
        );
        assert_eq!(
            LedgerEntryType::Subtract.apply(amount, prev),
            Money::from_major(4500)
        );
    }

    #[test]
    fn test_receipt_from_transaction() {
        let now = Utc::now();
        let txn = Transaction {
            id: "txn-1".to_string(),
            store_id: "store-1".to_string(),
            transaction_number: "TRX20260830ABC123".to_string(),
            customer_id: None,
            customer_name: WALK_IN_CUSTOMER.to_string(),
            items: vec![LineItem {
                product_id: "a".to_string(),
                product_name: "Indomie Goreng".to_string(),
                quantity: 2,
                unit_price_cents: Money::from_major(3500),
                line_total_cents: Money::from_major(7000),
                unit: "pcs".to_string(),
            }],
            subtotal_cents: Money::from_major(7000),
            discount_cents: Money::zero(),
            tax_cents: Money::zero(),
            total_cents: Money::from_major(7000),
            payment_method: PaymentMethod::Qris,
            payment_status: PaymentStatus::Paid,
            notes: String::new(),
            cashier_id: "cashier-1".to_string(),
            cashier_name: "Admin".to_string(),
            mirror_id: None,
            created_at: now,
            updated_at: now,
        };

        let receipt = Receipt::from(&txn);
        assert_eq!(receipt.items_count, 1);
        assert_eq!(receipt.formatted_total, "Rp 7.000");
        assert_eq!(receipt.payment_method_label, "QRIS");
        assert_eq!(receipt.payment_status_label, "Lunas");
        assert_eq!(txn.total_items_quantity(), 2);
    }
}
