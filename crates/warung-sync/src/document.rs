//! # Document Store Client
//!
//! The seam between the relay and the secondary document store.
//!
//! ## Why a Trait
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     DocumentStore Seam                                  │
//! │                                                                         │
//! │   ReplicationRelay ──► dyn DocumentStore                               │
//! │                            │                                            │
//! │              ┌─────────────┴─────────────┐                             │
//! │              ▼                           ▼                             │
//! │   RestDocumentStore              MemoryDocumentStore                   │
//! │   (reqwest, production)          (Vec + Mutex, tests)                  │
//! │                                                                         │
//! │  The relay's drop/retry/writeback behavior is what needs testing;      │
//! │  the trait lets tests observe exactly what was mirrored without a      │
//! │  network.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use warung_core::{Customer, LineItem, Product, Transaction};

// =============================================================================
// Mirror Document Shapes
// =============================================================================

/// A transaction as mirrored to the document store.
///
/// Flattened for reporting: money as plain cents, items embedded, labels
/// included so the mirror is readable without this codebase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDocument {
    /// Local UUID, for correlation back to the source row.
    pub local_id: String,
    pub store_id: String,
    pub transaction_number: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub items: Vec<LineItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: String,
    pub payment_method_label: String,
    pub payment_status: String,
    pub payment_status_label: String,
    pub items_count: usize,
    pub total_items_quantity: i64,
    pub notes: String,
    pub cashier_id: String,
    pub cashier_name: String,
    pub created_at: String,
}

impl From<&Transaction> for TransactionDocument {
    fn from(txn: &Transaction) -> Self {
        TransactionDocument {
            local_id: txn.id.clone(),
            store_id: txn.store_id.clone(),
            transaction_number: txn.transaction_number.clone(),
            customer_id: txn.customer_id.clone(),
            customer_name: txn.customer_name.clone(),
            items: txn.items.clone(),
            subtotal_cents: txn.subtotal_cents.cents(),
            discount_cents: txn.discount_cents.cents(),
            tax_cents: txn.tax_cents.cents(),
            total_cents: txn.total_cents.cents(),
            payment_method: txn.payment_method.as_str().to_string(),
            payment_method_label: txn.payment_method.label().to_string(),
            payment_status: txn.payment_status.as_str().to_string(),
            payment_status_label: txn.payment_status.label().to_string(),
            items_count: txn.items_count(),
            total_items_quantity: txn.total_items_quantity(),
            notes: txn.notes.clone(),
            cashier_id: txn.cashier_id.clone(),
            cashier_name: txn.cashier_name.clone(),
            created_at: txn.created_at.to_rfc3339(),
        }
    }
}

/// A receivables movement as mirrored to the document store.
///
/// Written alongside the transaction document for credit sales, so the
/// mirror's debt reporting does not need to re-derive it from transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivableLogDocument {
    pub store_id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub transaction_number: String,
    pub entry_type: String,
    pub amount_cents: i64,
    pub created_at: String,
}

impl ReceivableLogDocument {
    /// The credit extension recorded for a receivables transaction.
    pub fn credit_for(txn: &Transaction) -> Self {
        ReceivableLogDocument {
            store_id: txn.store_id.clone(),
            customer_id: txn.customer_id.clone(),
            customer_name: txn.customer_name.clone(),
            transaction_number: txn.transaction_number.clone(),
            entry_type: "add".to_string(),
            amount_cents: txn.total_cents.cents(),
            created_at: txn.created_at.to_rfc3339(),
        }
    }
}

/// A catalog product as mirrored to the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDocument {
    /// Local UUID, for correlation back to the source row.
    pub local_id: String,
    pub store_id: String,
    pub name: String,
    pub sku: String,
    pub price_cents: i64,
    pub price_sell_cents: i64,
    pub stock: i64,
    pub unit: String,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        ProductDocument {
            local_id: product.id.clone(),
            store_id: product.store_id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            price_cents: product.price_cents.cents(),
            price_sell_cents: product.price_sell_cents.cents(),
            stock: product.stock,
            unit: product.unit.clone(),
            category: product.category.clone(),
            is_active: product.is_active,
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

/// A customer as mirrored to the document store.
///
/// Aggregates are the values at mirroring time; the mirror is not updated as
/// sales move them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDocument {
    /// Local UUID, for correlation back to the source row.
    pub local_id: String,
    pub store_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub total_receivables_cents: i64,
    pub total_spent_cents: i64,
    pub total_transactions: i64,
    pub is_active: bool,
    pub created_at: String,
}

impl From<&Customer> for CustomerDocument {
    fn from(customer: &Customer) -> Self {
        CustomerDocument {
            local_id: customer.id.clone(),
            store_id: customer.store_id.clone(),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            total_receivables_cents: customer.total_receivables_cents.cents(),
            total_spent_cents: customer.total_spent_cents.cents(),
            total_transactions: customer.total_transactions,
            is_active: customer.is_active,
            created_at: customer.created_at.to_rfc3339(),
        }
    }
}

// =============================================================================
// DocumentStore Trait
// =============================================================================

/// A secondary document store that accepts mirrored documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document in a collection, returning the store-assigned id.
    async fn create_document(
        &self,
        collection: &str,
        payload: serde_json::Value,
    ) -> RelayResult<String>;
}

// =============================================================================
// REST Implementation
// =============================================================================

/// Document store client speaking a Firestore-style REST API.
///
/// `POST {base_url}/{collection}` with a JSON body; the response carries the
/// assigned document id as `{"id": "..."}`.
pub struct RestDocumentStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestDocumentStore {
    /// Creates a REST document store client.
    pub fn new(base_url: impl Into<String>, config: &RelayConfig) -> RelayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::Store(e.to_string()))?;

        Ok(RestDocumentStore {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        payload: serde_json::Value,
    ) -> RelayResult<String> {
        let url = format!("{}/{}", self.base_url, collection);

        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::StoreStatus {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreateResponse = response.json().await?;
        debug!(collection = %collection, id = %created.id, "Document mirrored");
        Ok(created.id)
    }
}

// =============================================================================
// In-Memory Implementation (tests)
// =============================================================================

/// In-memory document store for tests.
///
/// Records every created document and can be told to fail the next N calls.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<Vec<(String, serde_json::Value)>>,
    fail_next: AtomicU64,
    next_id: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` create calls fail.
    pub fn fail_next(&self, count: u64) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Returns all (collection, payload) pairs created so far.
    pub fn documents(&self) -> Vec<(String, serde_json::Value)> {
        self.documents.lock().expect("store lock poisoned").clone()
    }

    /// Number of documents created so far.
    pub fn len(&self) -> usize {
        self.documents.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        payload: serde_json::Value,
    ) -> RelayResult<String> {
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(RelayError::Store("injected failure".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mirror_id = format!("doc-{id:06}");

        self.documents
            .lock()
            .expect("store lock poisoned")
            .push((collection.to_string(), payload));

        Ok(mirror_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use warung_core::{Money, PaymentMethod, PaymentStatus};

    fn sample_transaction() -> Transaction {
        let now = Utc::now();
        Transaction {
            id: "txn-1".to_string(),
            store_id: "store-1".to_string(),
            transaction_number: "TRX20260830AB12CD".to_string(),
            customer_id: None,
            customer_name: "Walk-in Customer".to_string(),
            items: vec![LineItem {
                product_id: "p-1".to_string(),
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
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            notes: String::new(),
            cashier_id: "c-1".to_string(),
            cashier_name: "Admin".to_string(),
            mirror_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_document_from_transaction() {
        let doc = TransactionDocument::from(&sample_transaction());
        assert_eq!(doc.total_cents, 700000);
        assert_eq!(doc.payment_method, "cash");
        assert_eq!(doc.payment_method_label, "Tunai");
        assert_eq!(doc.payment_status_label, "Lunas");
        assert_eq!(doc.total_items_quantity, 2);
    }

    #[tokio::test]
    async fn test_memory_store_records_and_fails() {
        let store = MemoryDocumentStore::new();

        let id = store
            .create_document("transactions", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        assert_eq!(id, "doc-000000");
        assert_eq!(store.len(), 1);

        store.fail_next(1);
        assert!(store
            .create_document("transactions", serde_json::json!({"a": 2}))
            .await
            .is_err());

        // Failure budget consumed, next call succeeds.
        assert!(store
            .create_document("transactions", serde_json::json!({"a": 3}))
            .await
            .is_ok());
        assert_eq!(store.len(), 2);
    }
}
