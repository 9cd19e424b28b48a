//! # Replication Relay
//!
//! Best-effort mirroring of committed rows to the document store.
//!
//! ## Relay Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Replication Relay Flow                             │
//! │                                                                         │
//! │  CheckoutService (after COMMIT) / CatalogService (after INSERT)        │
//! │       │ offer_transaction / offer_product / offer_customer             │
//! │       │                     ← try_send, NEVER blocks                   │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────┐                                         │
//! │  │  bounded mpsc queue (256) │  full? drop + warn — the row is         │
//! │  │  of RelayEvent            │  already durable locally                │
//! │  └───────────┬───────────────┘                                         │
//! │              ▼                                                          │
//! │  ReplicationRelay worker (spawned task)                                │
//! │       │                                                                 │
//! │       ├── 1. serialize the document for the event's collection         │
//! │       │      (transactions / products / customers)                     │
//! │       ├── 2. store.create_document(collection, doc)                    │
//! │       │      └── fail? retry (max_attempts, retry_delay) then drop     │
//! │       └── 3. writeback: set_mirror_id(local_id, doc_id) on the         │
//! │              matching repository                                       │
//! │                                                                         │
//! │  Shutdown: handle.shutdown() → worker drains the queue, then exits.    │
//! │                                                                         │
//! │  GUARANTEE: nothing in this file can fail a checkout or a catalog      │
//! │  write. The local database is the source of truth; the mirror is      │
//! │  eventually consistent at best and stale at worst.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::document::{
    CustomerDocument, DocumentStore, ProductDocument, ReceivableLogDocument, TransactionDocument,
};
use crate::error::RelayResult;
use warung_core::{Customer, PaymentMethod, Product, Transaction};
use warung_db::{Database, ReplicationSink};

/// Collection name transactions are mirrored into.
const TRANSACTIONS_COLLECTION: &str = "transactions";

/// Collection name receivables movements are mirrored into.
const RECEIVABLES_COLLECTION: &str = "receivables_logs";

/// Collection name products are mirrored into.
const PRODUCTS_COLLECTION: &str = "products";

/// Collection name customers are mirrored into.
const CUSTOMERS_COLLECTION: &str = "customers";

// =============================================================================
// Relay Events
// =============================================================================

/// One item on the relay queue: a committed row awaiting its mirror copy.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    Transaction(Transaction),
    Product(Product),
    Customer(Customer),
}

impl RelayEvent {
    /// Short identification for log lines.
    fn label(&self) -> String {
        match self {
            RelayEvent::Transaction(txn) => format!("transaction {}", txn.transaction_number),
            RelayEvent::Product(product) => format!("product {}", product.sku),
            RelayEvent::Customer(customer) => format!("customer {}", customer.name),
        }
    }
}

// =============================================================================
// Relay Handle
// =============================================================================

/// Cheap, cloneable handle for feeding the relay and shutting it down.
///
/// This is the [`ReplicationSink`] the checkout and catalog services hold.
#[derive(Clone)]
pub struct RelayHandle {
    queue_tx: mpsc::Sender<RelayEvent>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RelayHandle {
    /// Triggers graceful shutdown: the worker drains queued items, then exits.
    pub async fn shutdown(&self) {
        // An already-stopped worker is fine; shutdown is idempotent.
        let _ = self.shutdown_tx.send(()).await;
    }

    /// Non-blocking enqueue. A full queue or stopped worker drops the item
    /// with a warning — never an error, never a wait.
    fn enqueue(&self, event: RelayEvent) {
        match self.queue_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(
                    item = %event.label(),
                    "Replication queue full, dropping item (mirror will be stale)"
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(
                    item = %event.label(),
                    "Replication relay stopped, dropping item"
                );
            }
        }
    }
}

impl ReplicationSink for RelayHandle {
    fn offer_transaction(&self, transaction: &Transaction) {
        self.enqueue(RelayEvent::Transaction(transaction.clone()));
    }

    fn offer_product(&self, product: &Product) {
        self.enqueue(RelayEvent::Product(product.clone()));
    }

    fn offer_customer(&self, customer: &Customer) {
        self.enqueue(RelayEvent::Customer(customer.clone()));
    }
}

// =============================================================================
// Replication Relay
// =============================================================================

/// The relay worker. Owns the queue receiver; runs until shutdown.
pub struct ReplicationRelay {
    db: Database,
    store: Arc<dyn DocumentStore>,
    config: RelayConfig,
    queue_rx: mpsc::Receiver<RelayEvent>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl ReplicationRelay {
    /// Creates a relay and its handle.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let (relay, handle) = ReplicationRelay::new(db.clone(), store, config);
    /// tokio::spawn(relay.run());
    /// let service = CheckoutService::new(db, Box::new(handle.clone()));
    /// ```
    pub fn new(
        db: Database,
        store: Arc<dyn DocumentStore>,
        config: RelayConfig,
    ) -> (Self, RelayHandle) {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let relay = ReplicationRelay {
            db,
            store,
            config,
            queue_rx,
            shutdown_rx,
        };

        let handle = RelayHandle {
            queue_tx,
            shutdown_tx,
        };

        (relay, handle)
    }

    /// Runs the relay loop. Spawn as a background task.
    pub async fn run(mut self) {
        info!(
            queue_capacity = self.config.queue_capacity,
            max_attempts = self.config.max_attempts,
            "Replication relay starting"
        );

        loop {
            tokio::select! {
                Some(event) = self.queue_rx.recv() => {
                    self.mirror_one(event).await;
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Replication relay shutting down, draining queue");
                    self.drain().await;
                    break;
                }
            }
        }

        info!("Replication relay stopped");
    }

    /// Drains whatever is already queued, without waiting for new items.
    async fn drain(&mut self) {
        while let Ok(event) = self.queue_rx.try_recv() {
            self.mirror_one(event).await;
        }
    }

    /// Mirrors one event, with bounded retries. Failures are logged and
    /// swallowed; the item is dropped after the last attempt.
    async fn mirror_one(&self, event: RelayEvent) {
        let label = event.label();

        for attempt in 1..=self.config.max_attempts {
            match self.try_mirror(&event).await {
                Ok(mirror_id) => {
                    debug!(item = %label, mirror_id = %mirror_id, "Item mirrored");

                    self.write_back(&event, &mirror_id).await;

                    // Credit sales also get a receivables log document.
                    // Single attempt: the transaction document is the source
                    // of truth in the mirror, this is derived convenience.
                    if let RelayEvent::Transaction(txn) = &event {
                        if txn.payment_method == PaymentMethod::Receivables {
                            if let Err(e) = self.mirror_receivable_log(txn).await {
                                warn!(item = %label, error = %e, "Receivables log mirroring failed");
                            }
                        }
                    }
                    return;
                }
                Err(e) if attempt < self.config.max_attempts => {
                    warn!(
                        item = %label,
                        attempt,
                        error = %e,
                        "Mirroring attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    error!(
                        item = %label,
                        attempts = self.config.max_attempts,
                        error = %e,
                        "Mirroring failed, giving up on item"
                    );
                }
            }
        }
    }

    /// One mirroring attempt: serialize the event's document and create it
    /// in the matching collection.
    async fn try_mirror(&self, event: &RelayEvent) -> RelayResult<String> {
        let (collection, payload) = match event {
            RelayEvent::Transaction(txn) => (
                TRANSACTIONS_COLLECTION,
                serde_json::to_value(TransactionDocument::from(txn))?,
            ),
            RelayEvent::Product(product) => (
                PRODUCTS_COLLECTION,
                serde_json::to_value(ProductDocument::from(product))?,
            ),
            RelayEvent::Customer(customer) => (
                CUSTOMERS_COLLECTION,
                serde_json::to_value(CustomerDocument::from(customer))?,
            ),
        };

        self.store.create_document(collection, payload).await
    }

    /// Records the mirror id on the source row.
    ///
    /// Writeback failure is logged, not retried: the mirror document exists,
    /// only the local correlation is missing.
    async fn write_back(&self, event: &RelayEvent, mirror_id: &str) {
        let result = match event {
            RelayEvent::Transaction(txn) => {
                self.db.transactions().set_mirror_id(&txn.id, mirror_id).await
            }
            RelayEvent::Product(product) => {
                self.db.products().set_mirror_id(&product.id, mirror_id).await
            }
            RelayEvent::Customer(customer) => {
                self.db.customers().set_mirror_id(&customer.id, mirror_id).await
            }
        };

        if let Err(e) = result {
            error!(item = %event.label(), error = %e, "Mirror-id writeback failed");
        }
    }

    /// Mirrors the credit-extension log for a receivables sale.
    async fn mirror_receivable_log(&self, txn: &Transaction) -> RelayResult<String> {
        let document = ReceivableLogDocument::credit_for(txn);
        let payload = serde_json::to_value(&document)?;

        self.store
            .create_document(RECEIVABLES_COLLECTION, payload)
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocumentStore;
    use chrono::Utc;
    use std::time::Duration;
    use warung_core::{LineItem, Money, PaymentMethod, PaymentStatus};
    use warung_db::DbConfig;

    fn sample_transaction(id: &str, number: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            transaction_number: number.to_string(),
            customer_id: None,
            customer_name: "Walk-in Customer".to_string(),
            items: vec![LineItem {
                product_id: "p-1".to_string(),
                product_name: "Indomie Goreng".to_string(),
                quantity: 1,
                unit_price_cents: Money::from_major(3500),
                line_total_cents: Money::from_major(3500),
                unit: "pcs".to_string(),
            }],
            subtotal_cents: Money::from_major(3500),
            discount_cents: Money::zero(),
            tax_cents: Money::zero(),
            total_cents: Money::from_major(3500),
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

    fn fast_config() -> RelayConfig {
        RelayConfig::default()
            .max_attempts(2)
            .retry_delay(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_mirror_success_writes_back_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());

        let (relay, handle) = ReplicationRelay::new(db.clone(), store.clone(), fast_config());
        let worker = tokio::spawn(relay.run());

        // The row must exist for writeback to land.
        let txn = sample_transaction("txn-mirror-1", "TRX20260830AAAA01");
        let mut conn = db.pool().acquire().await.unwrap();
        warung_db::TransactionRepository::insert(&mut *conn, &txn)
            .await
            .unwrap();
        drop(conn);

        handle.offer_transaction(&txn);

        handle.shutdown().await;
        worker.await.unwrap();

        assert_eq!(store.len(), 1);
        let stored = db.transactions().get_by_id("txn-mirror-1").await.unwrap();
        assert_eq!(stored.mirror_id.as_deref(), Some("doc-000000"));
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        store.fail_next(10); // exceed max_attempts, item is dropped

        let (relay, handle) = ReplicationRelay::new(db.clone(), store.clone(), fast_config());
        let worker = tokio::spawn(relay.run());

        let txn = sample_transaction("txn-fail-1", "TRX20260830BBBB01");
        handle.offer_transaction(&txn);

        handle.shutdown().await;
        worker.await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        store.fail_next(1); // first attempt fails, second succeeds

        let (relay, handle) = ReplicationRelay::new(db.clone(), store.clone(), fast_config());
        let worker = tokio::spawn(relay.run());

        let txn = sample_transaction("txn-retry-1", "TRX20260830CCCC01");
        let mut conn = db.pool().acquire().await.unwrap();
        warung_db::TransactionRepository::insert(&mut *conn, &txn)
            .await
            .unwrap();
        drop(conn);

        handle.offer_transaction(&txn);

        handle.shutdown().await;
        worker.await.unwrap();

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_receivables_sale_also_mirrors_log() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());

        let (relay, handle) = ReplicationRelay::new(db.clone(), store.clone(), fast_config());
        let worker = tokio::spawn(relay.run());

        let mut txn = sample_transaction("txn-piutang-1", "TRX20260830FFFF01");
        txn.payment_method = PaymentMethod::Receivables;
        txn.payment_status = PaymentStatus::Pending;
        txn.customer_name = "Budi Santoso".to_string();

        let mut conn = db.pool().acquire().await.unwrap();
        warung_db::TransactionRepository::insert(&mut *conn, &txn)
            .await
            .unwrap();
        drop(conn);

        handle.offer_transaction(&txn);
        handle.shutdown().await;
        worker.await.unwrap();

        let docs = store.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "transactions");
        assert_eq!(docs[1].0, "receivables_logs");
        assert_eq!(docs[1].1["entry_type"], "add");
        assert_eq!(docs[1].1["amount_cents"], 350000);
    }

    #[tokio::test]
    async fn test_product_create_mirrors_and_writes_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());

        let (relay, handle) = ReplicationRelay::new(db.clone(), store.clone(), fast_config());
        let worker = tokio::spawn(relay.run());

        let product = db
            .products()
            .create(
                "store-1",
                "Indomie Goreng",
                "IDM-GRG",
                Money::from_major(2800),
                Money::from_major(3500),
                10,
                "pcs",
                Some("Makanan"),
            )
            .await
            .unwrap();

        handle.offer_product(&product);
        handle.shutdown().await;
        worker.await.unwrap();

        let docs = store.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "products");
        assert_eq!(docs[0].1["sku"], "IDM-GRG");
        assert_eq!(docs[0].1["price_sell_cents"], 350000);
        assert_eq!(docs[0].1["local_id"], product.id.as_str());

        let stored = db.products().get_by_id(&product.id).await.unwrap();
        assert_eq!(stored.mirror_id.as_deref(), Some("doc-000000"));
    }

    #[tokio::test]
    async fn test_customer_create_mirrors_and_writes_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());

        let (relay, handle) = ReplicationRelay::new(db.clone(), store.clone(), fast_config());
        let worker = tokio::spawn(relay.run());

        let customer = db
            .customers()
            .create("store-1", "Budi Santoso", Some("081234567890"))
            .await
            .unwrap();

        handle.offer_customer(&customer);
        handle.shutdown().await;
        worker.await.unwrap();

        let docs = store.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "customers");
        assert_eq!(docs[0].1["name"], "Budi Santoso");
        assert_eq!(docs[0].1["total_receivables_cents"], 0);

        let stored = db.customers().get_by_id(&customer.id).await.unwrap();
        assert_eq!(stored.mirror_id.as_deref(), Some("doc-000000"));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());

        // Capacity 1 and a never-started worker: second offer finds the
        // queue full and must return immediately.
        let config = fast_config().queue_capacity(1);
        let (_relay, handle) = ReplicationRelay::new(db, store, config);

        let txn1 = sample_transaction("txn-q-1", "TRX20260830DDDD01");
        let txn2 = sample_transaction("txn-q-2", "TRX20260830DDDD02");

        handle.offer_transaction(&txn1);
        handle.offer_transaction(&txn2); // dropped, but no panic and no block
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryDocumentStore::new());

        let (relay, handle) = ReplicationRelay::new(db.clone(), store.clone(), fast_config());

        // Queue before the worker starts, then run it with shutdown already
        // signalled: everything queued must still be mirrored.
        handle.offer_transaction(&sample_transaction("txn-d-1", "TRX20260830EEEE01"));
        handle.offer_transaction(&sample_transaction("txn-d-2", "TRX20260830EEEE02"));
        handle.shutdown().await;

        relay.run().await;

        assert_eq!(store.len(), 2);
    }
}
