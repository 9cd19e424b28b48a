//! # Product Repository
//!
//! Database operations for the inventory store.
//!
//! ## Guarded Check-and-Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Oversell-Free Stock Reservation                            │
//! │                                                                         │
//! │  Two checkouts race for the last 3 units of "Indomie Goreng":          │
//! │                                                                         │
//! │  Checkout A (qty 2)                Checkout B (qty 2)                  │
//! │       │                                 │                               │
//! │       ▼                                 │                               │
//! │  UPDATE products SET stock = stock - 2  │                               │
//! │  WHERE id = ?1 AND stock >= 2           │                               │
//! │  → 1 row affected (stock now 1)         ▼                               │
//! │                                    UPDATE ... AND stock >= 2            │
//! │                                    → 0 rows affected                    │
//! │                                    → InsufficientStock, tx rolls back   │
//! │                                                                         │
//! │  The check and the decrement are ONE statement; there is no            │
//! │  read-then-write window to race through. CHECK (stock >= 0) in the     │
//! │  schema backstops the same invariant.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warung_core::{Money, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Standalone read
/// let product = repo.get_by_id("uuid-here").await?;
///
/// // Inside a checkout transaction scope
/// repo.reserve_stock(&mut tx, "uuid-here", 2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, store_id, name, sku, price_cents, price_sell_cents, stock, \
     unit, category, description, image_url, is_active, mirror_id, created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Fetches a product by its UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists active products for a store, sorted by name.
    pub async fn list_by_store(&self, store_id: &str, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE store_id = ?1 AND is_active = 1 \
             ORDER BY name COLLATE NOCASE \
             LIMIT ?2"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(store_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(store_id = %store_id, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists active products at or below a stock threshold.
    ///
    /// Used by restock views; ordered lowest stock first.
    pub async fn list_low_stock(&self, store_id: &str, threshold: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE store_id = ?1 AND is_active = 1 AND stock <= ?2 \
             ORDER BY stock ASC, name COLLATE NOCASE"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(store_id)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// Fails with `UniqueViolation` if the (store_id, sku) pair already exists.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, name, sku, price_cents, price_sell_cents, stock,
                unit, category, description, image_url, is_active, mirror_id,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price_cents)
        .bind(product.price_sell_cents)
        .bind(product.stock)
        .bind(&product.unit)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(&product.mirror_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(id = %product.id, sku = %product.sku, "Product inserted");
        Ok(())
    }

    /// Creates a product with generated UUID and timestamps.
    ///
    /// Convenience constructor used by the bootstrap seeder.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
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
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            name: name.to_string(),
            sku: sku.to_string(),
            price_cents,
            price_sell_cents,
            stock,
            unit: unit.to_string(),
            category: category.map(String::from),
            description: None,
            image_url: None,
            is_active: true,
            mirror_id: None,
            created_at: now,
            updated_at: now,
        };

        self.insert(&product).await?;
        Ok(product)
    }

    /// Counts products in a store (active or not).
    pub async fn count_by_store(&self, store_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE store_id = ?1")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Records the document id the secondary store assigned to this product.
    pub async fn set_mirror_id(&self, id: &str, mirror_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET mirror_id = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(mirror_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    // =========================================================================
    // Transaction-scoped operations (run inside the checkout's atomic scope)
    // =========================================================================

    /// Fetches a product inside an open transaction.
    ///
    /// The checkout orchestrator snapshots name/unit/stock through this read;
    /// the snapshot is consistent with the decrements that follow because
    /// everything shares one transaction.
    pub async fn get_for_checkout(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    /// Atomically decrements stock if (and only if) enough remains.
    ///
    /// Returns `Ok(true)` when the reservation succeeded, `Ok(false)` when
    /// stock was insufficient (zero rows matched the guard). The caller rolls
    /// the surrounding transaction back on `false`.
    pub async fn reserve_stock(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        let reserved = result.rows_affected() == 1;
        debug!(id = %id, quantity, reserved, "Stock reservation attempt");
        Ok(reserved)
    }

    /// Reads the current stock level inside an open transaction.
    ///
    /// Used to report `available` in insufficient-stock errors.
    pub async fn current_stock(conn: &mut SqliteConnection, id: &str) -> DbResult<i64> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(stock.unwrap_or(0))
    }

    /// Increments stock (restock / reserved refund inverse of reserve_stock).
    pub async fn increase_stock(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }
}
