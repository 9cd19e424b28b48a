//! # Receivables Ledger Repository
//!
//! Append-only audit trail of customer credit movements.
//!
//! ## Running Balance Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Ledger ↔ Aggregate Consistency                        │
//! │                                                                         │
//! │  receivables_ledger (append-only)          customers                   │
//! │  ┌──────────────────────────────────┐      ┌──────────────────────┐    │
//! │  │ add      9500   prev 0 → 9500    │      │ total_receivables    │    │
//! │  │ add      5000   prev 9500→14500  │ ───► │        = 14500       │    │
//! │  │ (next entry's prev = 14500)      │      └──────────────────────┘    │
//! │  └──────────────────────────────────┘                                  │
//! │                                                                         │
//! │  append() does all three steps inside the caller's transaction:        │
//! │    1. read current balance        (previous_balance)                   │
//! │    2. insert the ledger entry     (with computed new_balance)          │
//! │    3. write the new balance back onto the customer row                 │
//! │                                                                         │
//! │  Rows are never updated or deleted. The aggregate always equals the    │
//! │  latest entry's new_balance.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::customer::CustomerRepository;
use warung_core::{LedgerEntry, LedgerEntryType, Money};

const SELECT_COLUMNS: &str = "id, store_id, customer_id, entry_type, amount_cents, \
     previous_balance_cents, new_balance_cents, transaction_id, notes, created_at";

/// Repository for receivables ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Lists a customer's ledger entries, oldest first.
    ///
    /// Oldest-first so the running balance reads top to bottom.
    pub async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM receivables_ledger \
             WHERE customer_id = ?1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT ?2"
        );

        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Lists ledger entries tied to a specific transaction.
    pub async fn list_for_transaction(
        &self,
        transaction_id: &str,
    ) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM receivables_ledger \
             WHERE transaction_id = ?1 \
             ORDER BY created_at ASC"
        );

        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(transaction_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Sum of balance deltas across a customer's entries.
    ///
    /// Telescopes to the current balance (each entry's delta is
    /// `new_balance − previous_balance`); consistency checks compare this
    /// against `customers.total_receivables_cents`.
    pub async fn sum_deltas(&self, customer_id: &str) -> DbResult<Money> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(new_balance_cents - previous_balance_cents), 0) \
             FROM receivables_ledger WHERE customer_id = ?1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(sum))
    }

    // =========================================================================
    // Transaction-scoped operations (run inside the checkout's atomic scope)
    // =========================================================================

    /// Appends a ledger entry and updates the customer's balance, atomically
    /// with the caller's transaction.
    ///
    /// Returns the created entry. `Subtract` clamps the balance at zero per
    /// [`LedgerEntryType::apply`].
    pub async fn append(
        conn: &mut SqliteConnection,
        store_id: &str,
        customer_id: &str,
        entry_type: LedgerEntryType,
        amount: Money,
        transaction_id: Option<&str>,
        notes: &str,
    ) -> DbResult<LedgerEntry> {
        // 1. Current balance — the entry's previous_balance.
        let previous: i64 = sqlx::query_scalar(
            "SELECT total_receivables_cents FROM customers WHERE id = ?1",
        )
        .bind(customer_id)
        .fetch_one(&mut *conn)
        .await?;

        let previous_balance = Money::from_cents(previous);
        let new_balance = entry_type.apply(previous_balance, amount);

        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            customer_id: customer_id.to_string(),
            entry_type,
            amount_cents: amount,
            previous_balance_cents: previous_balance,
            new_balance_cents: new_balance,
            transaction_id: transaction_id.map(String::from),
            notes: notes.to_string(),
            created_at: Utc::now(),
        };

        // 2. Append the audit row.
        sqlx::query(
            r#"
            INSERT INTO receivables_ledger (
                id, store_id, customer_id, entry_type, amount_cents,
                previous_balance_cents, new_balance_cents, transaction_id,
                notes, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.store_id)
        .bind(&entry.customer_id)
        .bind(entry.entry_type)
        .bind(entry.amount_cents)
        .bind(entry.previous_balance_cents)
        .bind(entry.new_balance_cents)
        .bind(&entry.transaction_id)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await?;

        // 3. Write the new balance onto the customer row.
        CustomerRepository::set_receivables_balance(conn, customer_id, new_balance.cents())
            .await?;

        debug!(
            customer_id = %customer_id,
            entry_type = %entry_type.as_str(),
            amount = %amount,
            new_balance = %new_balance,
            "Ledger entry appended"
        );

        Ok(entry)
    }
}
