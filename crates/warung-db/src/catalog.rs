//! # Catalog Service
//!
//! Product and customer creation, wired to the replication sink.
//!
//! Checkout only ever reads the catalog; rows are created here. Each create
//! commits locally first and then offers the row for mirroring, the same
//! durable-then-replicate order the checkout orchestrator uses:
//!
//! ```text
//! create_product / create_customer
//!      │
//!      ▼
//! INSERT (local row is durable)
//!      │
//!      ▼
//! sink.offer_* (fire and forget — a down mirror never fails the create)
//! ```

use warung_core::{Customer, Money, Product};

use crate::checkout::{NullSink, ReplicationSink};
use crate::error::DbResult;
use crate::pool::Database;

/// Catalog writes that also feed the replication sink.
pub struct CatalogService {
    db: Database,
    sink: Box<dyn ReplicationSink>,
}

impl CatalogService {
    /// Creates a catalog service wired to a replication sink.
    pub fn new(db: Database, sink: Box<dyn ReplicationSink>) -> Self {
        CatalogService { db, sink }
    }

    /// Creates a catalog service with no mirroring.
    pub fn without_replication(db: Database) -> Self {
        Self::new(db, Box::new(NullSink))
    }

    /// Creates a product and offers it for mirroring.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_product(
        &self,
        store_id: &str,
        name: &str,
        sku: &str,
        price_cents: Money,
        price_sell_cents: Money,
        stock: i64,
        unit: &str,
        category: Option<&str>,
    ) -> DbResult<Product> {
        let product = self
            .db
            .products()
            .create(
                store_id,
                name,
                sku,
                price_cents,
                price_sell_cents,
                stock,
                unit,
                category,
            )
            .await?;

        self.sink.offer_product(&product);
        Ok(product)
    }

    /// Creates a customer and offers them for mirroring.
    pub async fn create_customer(
        &self,
        store_id: &str,
        name: &str,
        phone: Option<&str>,
    ) -> DbResult<Customer> {
        let customer = self.db.customers().create(store_id, name, phone).await?;

        self.sink.offer_customer(&customer);
        Ok(customer)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use std::sync::{Arc, Mutex};
    use warung_core::Transaction;

    /// Sink that records the ids it was offered.
    #[derive(Default)]
    struct RecordingSink {
        products: Mutex<Vec<String>>,
        customers: Mutex<Vec<String>>,
    }

    impl ReplicationSink for Arc<RecordingSink> {
        fn offer_transaction(&self, _transaction: &Transaction) {}

        fn offer_product(&self, product: &Product) {
            self.products.lock().unwrap().push(product.id.clone());
        }

        fn offer_customer(&self, customer: &Customer) {
            self.customers.lock().unwrap().push(customer.id.clone());
        }
    }

    #[tokio::test]
    async fn test_create_product_persists_and_offers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sink = Arc::new(RecordingSink::default());
        let catalog = CatalogService::new(db.clone(), Box::new(sink.clone()));

        let product = catalog
            .create_product(
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

        // Durable locally.
        let stored = db.products().get_by_id(&product.id).await.unwrap();
        assert_eq!(stored.sku, "IDM-GRG");
        assert!(stored.mirror_id.is_none());

        // And offered for mirroring.
        assert_eq!(*sink.products.lock().unwrap(), vec![product.id]);
    }

    #[tokio::test]
    async fn test_create_customer_persists_and_offers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sink = Arc::new(RecordingSink::default());
        let catalog = CatalogService::new(db.clone(), Box::new(sink.clone()));

        let customer = catalog
            .create_customer("store-1", "Budi Santoso", Some("081234567890"))
            .await
            .unwrap();

        let stored = db.customers().get_by_id(&customer.id).await.unwrap();
        assert_eq!(stored.name, "Budi Santoso");

        assert_eq!(*sink.customers.lock().unwrap(), vec![customer.id]);
    }

    #[tokio::test]
    async fn test_failed_insert_offers_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sink = Arc::new(RecordingSink::default());
        let catalog = CatalogService::new(db.clone(), Box::new(sink.clone()));

        catalog
            .create_product(
                "store-1",
                "Indomie Goreng",
                "IDM-GRG",
                Money::from_major(2800),
                Money::from_major(3500),
                10,
                "pcs",
                None,
            )
            .await
            .unwrap();

        // Duplicate SKU violates UNIQUE(store_id, sku): no row, no offer.
        let err = catalog
            .create_product(
                "store-1",
                "Indomie Goreng Jumbo",
                "IDM-GRG",
                Money::from_major(3000),
                Money::from_major(4000),
                5,
                "pcs",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DbError::UniqueViolation { .. }));

        assert_eq!(sink.products.lock().unwrap().len(), 1);
    }
}
