//! # Checkout Orchestrator
//!
//! The single place where a sale mutates the database. Everything a checkout
//! touches — stock, the transaction record, the receivables ledger, customer
//! aggregates — changes inside ONE sqlx transaction: all of it commits, or
//! none of it does.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Pipeline                                │
//! │                                                                         │
//! │  CheckoutRequest                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. validate (pure, warung-core) ──── fail → Invalid                   │
//! │       │                                                                 │
//! │       ▼  BEGIN ─────────────────────────────────────────────────┐      │
//! │  2. snapshot products          ── missing → NotFound, ROLLBACK  │      │
//! │  3. resolve customer (first match, walk-in skips)               │      │
//! │  4. insert transaction         ── number collision → retry ×5   │      │
//! │  5. reserve stock per line     ── short → Insufficient, ROLLBACK│      │
//! │  6. receivables? append ledger entry + balance                  │      │
//! │     paid?        recompute customer paid aggregates             │      │
//! │       │  COMMIT ────────────────────────────────────────────────┘      │
//! │       ▼                                                                 │
//! │  7. hand committed transaction to the replication sink (fire and       │
//! │     forget — a down mirror never fails a sale)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Transaction (the receipt source)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::customer::CustomerRepository;
use crate::repository::ledger::LedgerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::transaction::TransactionRepository;
use thiserror::Error;
use warung_core::{
    generate_transaction_number, validate_checkout, CheckoutRequest, LedgerEntryType, LineItem,
    PaymentMethod, Transaction, ValidationError,
};

/// Attempts at inserting with a fresh transaction number before giving up.
///
/// With 36^6 suffixes per day a collision is already rare; five in a row is
/// effectively impossible outside a broken RNG.
const MAX_TXN_NUMBER_ATTEMPTS: u32 = 5;

// =============================================================================
// Error Taxonomy
// =============================================================================

/// Caller-facing checkout failures.
///
/// Every variant except `Internal` maps to a distinct caller action:
/// fix the cart (`Invalid`, `ProductNotFound`, `InsufficientStock`) or
/// retry the whole checkout (`Conflict`).
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart failed pure validation; nothing was attempted.
    #[error("Invalid checkout request: {0}")]
    Invalid(#[from] ValidationError),

    /// A cart line referenced a product that does not exist or is inactive.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Stock could not cover a requested quantity. Reports what WAS
    /// available at decision time so the cashier can offer the remainder.
    #[error("Insufficient stock for {product_name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        product_name: String,
        requested: i64,
        available: i64,
    },

    /// Lost a race with a concurrent writer (lock timeout, pool exhaustion).
    /// The checkout left no trace; safe to retry.
    #[error("Checkout conflict, retry the request: {0}")]
    Conflict(String),

    /// Unexpected storage failure. Also covers exhausted transaction-number
    /// retries: five collisions in a row means a broken generator, not a
    /// race, so retrying the request would not help.
    #[error("Checkout failed: {0}")]
    Internal(String),
}

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Busy(msg) => CheckoutError::Conflict(msg),
            DbError::PoolExhausted => {
                CheckoutError::Conflict("connection pool exhausted".to_string())
            }
            other => CheckoutError::Internal(other.to_string()),
        }
    }
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Replication Sink
// =============================================================================

/// Where committed rows go after the local write is durable.
///
/// Implemented by the replication relay in `warung-sync`. Defined here so the
/// orchestrator does not depend on the relay crate (which depends on this one
/// for mirror-id writeback).
///
/// Every method MUST NOT block and MUST NOT fail the caller: implementations
/// drop (with a log line) rather than push back. The local row is already
/// durable when any of these are called.
pub trait ReplicationSink: Send + Sync {
    /// Offers a committed transaction for mirroring.
    fn offer_transaction(&self, transaction: &Transaction);

    /// Offers a newly created product for mirroring.
    fn offer_product(&self, product: &warung_core::Product);

    /// Offers a newly created customer for mirroring.
    fn offer_customer(&self, customer: &warung_core::Customer);
}

/// Sink that discards everything. Used when no mirror is configured,
/// and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReplicationSink for NullSink {
    fn offer_transaction(&self, _transaction: &Transaction) {}
    fn offer_product(&self, _product: &warung_core::Product) {}
    fn offer_customer(&self, _customer: &warung_core::Customer) {}
}

// =============================================================================
// Checkout Service
// =============================================================================

/// The checkout orchestrator.
///
/// ## Usage
/// ```rust,ignore
/// let service = CheckoutService::new(db.clone(), Box::new(relay.handle()));
/// let txn = service.checkout(request).await?;
/// println!("{}", txn.formatted_total()); // "Rp 9.500"
/// ```
pub struct CheckoutService {
    db: Database,
    sink: Box<dyn ReplicationSink>,
    number_generator: Box<dyn Fn() -> String + Send + Sync>,
}

impl CheckoutService {
    /// Creates a checkout service wired to a replication sink.
    pub fn new(db: Database, sink: Box<dyn ReplicationSink>) -> Self {
        CheckoutService {
            db,
            sink,
            number_generator: Box::new(generate_transaction_number),
        }
    }

    /// Creates a checkout service with no mirroring.
    pub fn without_replication(db: Database) -> Self {
        Self::new(db, Box::new(NullSink))
    }

    /// Replaces the transaction-number source, for forcing collisions.
    #[cfg(test)]
    fn with_number_generator(
        mut self,
        generator: Box<dyn Fn() -> String + Send + Sync>,
    ) -> Self {
        self.number_generator = generator;
        self
    }

    /// Runs a checkout end to end.
    ///
    /// On success the returned [`Transaction`] is durable; replication to the
    /// mirror happens afterwards and cannot affect the outcome. On any error
    /// the database is exactly as it was before the call.
    pub async fn checkout(&self, request: CheckoutRequest) -> CheckoutResult<Transaction> {
        // 1. Pure validation before touching the database.
        validate_checkout(&request)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        // 2. Snapshot every product up front. Missing/inactive products fail
        //    the whole checkout before any stock moves.
        let mut lines: Vec<(LineItem, i64)> = Vec::with_capacity(request.items.len());
        for cart_line in &request.items {
            let product = ProductRepository::get_for_checkout(&mut *tx, &cart_line.product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound {
                    product_id: cart_line.product_id.clone(),
                })?;

            lines.push((
                LineItem {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    quantity: cart_line.quantity,
                    unit_price_cents: cart_line.unit_price_cents,
                    line_total_cents: cart_line.line_total(),
                    unit: product.unit.clone(),
                },
                cart_line.quantity,
            ));
        }

        // 3. Customer resolution: first match wins, unknown names proceed
        //    unlinked, the walk-in sentinel skips the lookup entirely.
        let customer = if request.wants_customer_resolution() {
            CustomerRepository::find_by_name(
                &mut *tx,
                &request.store_id,
                request.display_customer_name(),
            )
            .await?
        } else {
            None
        };

        if request.payment_method == PaymentMethod::Receivables && customer.is_none() {
            // Receivables with nobody to owe them is a cart error, not a
            // storage error. Surfaced before any stock moves.
            tx.rollback().await.map_err(DbError::from)?;
            return Err(CheckoutError::Invalid(ValidationError::Required {
                field: "customer_name (receivables requires a known customer)".to_string(),
            }));
        }

        let now = Utc::now();
        let mut transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            store_id: request.store_id.clone(),
            transaction_number: (self.number_generator)(),
            customer_id: customer.as_ref().map(|c| c.id.clone()),
            customer_name: request.display_customer_name().to_string(),
            items: lines.iter().map(|(item, _)| item.clone()).collect(),
            subtotal_cents: request.subtotal(),
            discount_cents: request.discount_cents,
            tax_cents: request.tax_cents,
            total_cents: request.total(),
            payment_method: request.payment_method,
            payment_status: request.payment_method.initial_status(),
            notes: request.notes.clone().unwrap_or_default(),
            cashier_id: request.cashier_id.clone(),
            cashier_name: request.cashier_name.clone(),
            mirror_id: None,
            created_at: now,
            updated_at: now,
        };

        // 4. Insert, regenerating the number on collision. A failed INSERT
        //    does not poison a SQLite transaction, so retrying in place is
        //    safe.
        let mut inserted = false;
        for attempt in 1..=MAX_TXN_NUMBER_ATTEMPTS {
            match TransactionRepository::insert(&mut *tx, &transaction).await {
                Ok(()) => {
                    inserted = true;
                    break;
                }
                Err(DbError::UniqueViolation { field })
                    if field.contains("transaction_number") =>
                {
                    warn!(
                        attempt,
                        number = %transaction.transaction_number,
                        "Transaction number collision, regenerating"
                    );
                    transaction.transaction_number = (self.number_generator)();
                }
                Err(other) => return Err(other.into()),
            }
        }
        if !inserted {
            tx.rollback().await.map_err(DbError::from)?;
            return Err(CheckoutError::Internal(format!(
                "could not allocate a unique transaction number in {MAX_TXN_NUMBER_ATTEMPTS} attempts"
            )));
        }

        // 5. Guarded decrement per line. Any shortfall rolls everything back,
        //    including decrements already applied for earlier lines.
        for (item, quantity) in &lines {
            let reserved =
                ProductRepository::reserve_stock(&mut *tx, &item.product_id, *quantity).await?;

            if !reserved {
                let available =
                    ProductRepository::current_stock(&mut *tx, &item.product_id).await?;
                let err = CheckoutError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    requested: *quantity,
                    available,
                };
                tx.rollback().await.map_err(DbError::from)?;
                return Err(err);
            }
        }

        // 6. Payment-method side effects on the customer row.
        if let Some(customer) = &customer {
            match request.payment_method {
                PaymentMethod::Receivables => {
                    LedgerRepository::append(
                        &mut *tx,
                        &request.store_id,
                        &customer.id,
                        LedgerEntryType::Add,
                        transaction.total_cents,
                        Some(&transaction.id),
                        &format!("Piutang transaksi {}", transaction.transaction_number),
                    )
                    .await?;
                }
                _ => {
                    CustomerRepository::recompute_paid_stats(&mut *tx, &customer.id).await?;
                }
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            number = %transaction.transaction_number,
            total = %transaction.total_cents,
            method = %transaction.payment_method.as_str(),
            items = transaction.items_count(),
            "Checkout committed"
        );

        // 7. Fire-and-forget handoff to the mirror. The sale is already
        //    durable; a full queue or dead relay only costs replication.
        self.sink.offer_transaction(&transaction);

        Ok(transaction)
    }
}

// =============================================================================
// Tests
// =============================================================================
