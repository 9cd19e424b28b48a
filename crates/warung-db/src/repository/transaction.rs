//! # Transaction Repository
//!
//! Database operations for committed checkouts.
//!
//! ## Line Item Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Snapshot Items as a JSON Column                         │
//! │                                                                         │
//! │  transactions.items (TEXT):                                            │
//! │  [                                                                      │
//! │    { "product_id": "…", "product_name": "Indomie Goreng",              │
//! │      "quantity": 2, "unit_price_cents": 350000,                        │
//! │      "line_total_cents": 700000, "unit": "pcs" },                      │
//! │    …                                                                    │
//! │  ]                                                                      │
//! │                                                                         │
//! │  Items are immutable snapshots — never joined against the catalog,     │
//! │  never updated. A JSON column keeps the whole transaction one row,     │
//! │  which keeps insert atomicity trivial and reads single-query.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{LineItem, Money, PaymentMethod, PaymentStatus, Transaction};

const SELECT_COLUMNS: &str = "id, store_id, transaction_number, customer_id, customer_name, \
     items, subtotal_cents, discount_cents, tax_cents, total_cents, payment_method, \
     payment_status, notes, cashier_id, cashier_name, mirror_id, created_at, updated_at";

/// Raw row shape: `items` is JSON text and needs a decode step, so
/// `Transaction` itself cannot derive `FromRow`.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    store_id: String,
    transaction_number: String,
    customer_id: Option<String>,
    customer_name: String,
    items: String,
    subtotal_cents: Money,
    discount_cents: Money,
    tax_cents: Money,
    total_cents: Money,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    notes: String,
    cashier_id: String,
    cashier_name: String,
    mirror_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let items: Vec<LineItem> = serde_json::from_str(&row.items)?;

        Ok(Transaction {
            id: row.id,
            store_id: row.store_id,
            transaction_number: row.transaction_number,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            items,
            subtotal_cents: row.subtotal_cents,
            discount_cents: row.discount_cents,
            tax_cents: row.tax_cents,
            total_cents: row.total_cents,
            payment_method: row.payment_method,
            payment_status: row.payment_status,
            notes: row.notes,
            cashier_id: row.cashier_id,
            cashier_name: row.cashier_name,
            mirror_id: row.mirror_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Fetches a transaction by UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Transaction> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM transactions WHERE id = ?1");

        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;

        row.try_into()
    }

    /// Fetches a transaction by its human-readable number.
    pub async fn get_by_number(&self, transaction_number: &str) -> DbResult<Transaction> {
        let sql =
            format!("SELECT {SELECT_COLUMNS} FROM transactions WHERE transaction_number = ?1");

        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(transaction_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", transaction_number))?;

        row.try_into()
    }

    /// Lists transactions for a store, newest first.
    pub async fn list_by_store(&self, store_id: &str, limit: u32) -> DbResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM transactions \
             WHERE store_id = ?1 \
             ORDER BY created_at DESC \
             LIMIT ?2"
        );

        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(store_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Lists a customer's transactions, newest first.
    pub async fn list_by_customer(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> DbResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM transactions \
             WHERE customer_id = ?1 \
             ORDER BY created_at DESC \
             LIMIT ?2"
        );

        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Records the document id the secondary store assigned to this transaction.
    pub async fn set_mirror_id(&self, id: &str, mirror_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE transactions SET mirror_id = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(mirror_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }
        Ok(())
    }

    // =========================================================================
    // Transaction-scoped operations (run inside the checkout's atomic scope)
    // =========================================================================

    /// Inserts a committed checkout inside an open transaction.
    ///
    /// A `UniqueViolation` on `transaction_number` is NOT fatal to the
    /// surrounding sqlx transaction — a failed statement does not poison a
    /// SQLite transaction — so the orchestrator retries the insert with a
    /// fresh number.
    pub async fn insert(conn: &mut SqliteConnection, txn: &Transaction) -> DbResult<()> {
        let items_json = serde_json::to_string(&txn.items)?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, store_id, transaction_number, customer_id, customer_name,
                items, subtotal_cents, discount_cents, tax_cents, total_cents,
                payment_method, payment_status, notes, cashier_id, cashier_name,
                mirror_id, created_at, updated_at
            )
            VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18
            )
            "#,
        )
        .bind(&txn.id)
        .bind(&txn.store_id)
        .bind(&txn.transaction_number)
        .bind(&txn.customer_id)
        .bind(&txn.customer_name)
        .bind(items_json)
        .bind(txn.subtotal_cents)
        .bind(txn.discount_cents)
        .bind(txn.tax_cents)
        .bind(txn.total_cents)
        .bind(txn.payment_method)
        .bind(txn.payment_status)
        .bind(&txn.notes)
        .bind(&txn.cashier_id)
        .bind(&txn.cashier_name)
        .bind(&txn.mirror_id)
        .bind(txn.created_at)
        .bind(txn.updated_at)
        .execute(&mut *conn)
        .await?;

        debug!(
            id = %txn.id,
            number = %txn.transaction_number,
            total = %txn.total_cents,
            "Transaction inserted"
        );
        Ok(())
    }
}
