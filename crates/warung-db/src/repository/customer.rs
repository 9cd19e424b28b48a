//! # Customer Repository
//!
//! Database operations for customers and their derived aggregates.
//!
//! ## Name Resolution
//! Checkout carts carry a free-text `customer_name`. Resolution is a
//! first-match lookup: exact name within the store, lowest `id` wins when
//! duplicates exist. A name that matches nothing simply leaves the
//! transaction unlinked (denormalized name only) — it is never an error.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warung_core::Customer;

const SELECT_COLUMNS: &str = "id, store_id, name, phone, email, address, \
     total_receivables_cents, total_spent_cents, total_transactions, notes, \
     is_active, mirror_id, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Fetches a customer by UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Customer> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?1");

        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Lists active customers for a store, sorted by name.
    pub async fn list_by_store(&self, store_id: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM customers \
             WHERE store_id = ?1 AND is_active = 1 \
             ORDER BY name COLLATE NOCASE \
             LIMIT ?2"
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(store_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Lists customers carrying an outstanding receivables balance.
    ///
    /// Ordered by balance, largest debt first.
    pub async fn list_with_receivables(&self, store_id: &str) -> DbResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM customers \
             WHERE store_id = ?1 AND total_receivables_cents > 0 \
             ORDER BY total_receivables_cents DESC"
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                id, store_id, name, phone, email, address,
                total_receivables_cents, total_spent_cents, total_transactions,
                notes, is_active, mirror_id, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.store_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.total_receivables_cents)
        .bind(customer.total_spent_cents)
        .bind(customer.total_transactions)
        .bind(&customer.notes)
        .bind(customer.is_active)
        .bind(&customer.mirror_id)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %customer.id, name = %customer.name, "Customer inserted");
        Ok(())
    }

    /// Creates a customer with generated UUID, zeroed aggregates and timestamps.
    pub async fn create(
        &self,
        store_id: &str,
        name: &str,
        phone: Option<&str>,
    ) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            name: name.to_string(),
            phone: phone.map(String::from),
            email: None,
            address: None,
            total_receivables_cents: warung_core::Money::zero(),
            total_spent_cents: warung_core::Money::zero(),
            total_transactions: 0,
            notes: None,
            is_active: true,
            mirror_id: None,
            created_at: now,
            updated_at: now,
        };

        self.insert(&customer).await?;
        Ok(customer)
    }

    /// Records the document id the secondary store assigned to this customer.
    pub async fn set_mirror_id(&self, id: &str, mirror_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE customers SET mirror_id = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(mirror_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }
        Ok(())
    }

    // =========================================================================
    // Transaction-scoped operations (run inside the checkout's atomic scope)
    // =========================================================================

    /// Resolves a customer name to a row, first match wins.
    ///
    /// Exact name match within the store; duplicates are broken by lowest
    /// `id`. Returns `None` for an unknown name — the checkout proceeds
    /// unlinked in that case.
    pub async fn find_by_name(
        conn: &mut SqliteConnection,
        store_id: &str,
        name: &str,
    ) -> DbResult<Option<Customer>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM customers \
             WHERE store_id = ?1 AND name = ?2 AND is_active = 1 \
             ORDER BY id \
             LIMIT 1"
        );

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(store_id)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(customer)
    }

    /// Recomputes a customer's paid-transaction aggregates from source data.
    ///
    /// `total_spent` and `total_transactions` are derived from the customer's
    /// transactions with payment status `paid`. Recomputing from the source
    /// rather than incrementing keeps the aggregates self-healing: a single
    /// pass through here is always correct no matter what happened before.
    pub async fn recompute_paid_stats(
        conn: &mut SqliteConnection,
        customer_id: &str,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE customers
            SET total_spent_cents = (
                    SELECT COALESCE(SUM(total_cents), 0)
                    FROM transactions
                    WHERE customer_id = ?1 AND payment_status = 'paid'
                ),
                total_transactions = (
                    SELECT COUNT(*)
                    FROM transactions
                    WHERE customer_id = ?1 AND payment_status = 'paid'
                ),
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(customer_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Sets the receivables balance inside an open transaction.
    ///
    /// Only the ledger repository calls this, right after appending the entry
    /// that justifies the new balance.
    pub(crate) async fn set_receivables_balance(
        conn: &mut SqliteConnection,
        customer_id: &str,
        balance_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE customers SET total_receivables_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(customer_id)
        .bind(balance_cents)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }
        Ok(())
    }
}
