//! # Demo Data Bootstrap
//!
//! One-shot seeding of a demo store: a handful of catalog products and two
//! known customers. Idempotent — a store that already has products is left
//! untouched, so the seed binary can run on every start.

use tracing::info;

use crate::catalog::CatalogService;
use crate::checkout::CheckoutService;
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use warung_core::{CartLine, CheckoutRequest, Money, PaymentMethod};

/// Seeds demo catalog data for a store if (and only if) it has no products.
///
/// Returns `true` when seeding ran, `false` when the store already had data.
pub async fn seed_demo_store(db: &Database, store_id: &str) -> DbResult<bool> {
    if db.products().count_by_store(store_id).await? > 0 {
        info!(store_id = %store_id, "Store already seeded, skipping");
        return Ok(false);
    }

    let catalog_service = CatalogService::without_replication(db.clone());

    info!(store_id = %store_id, "Seeding demo store");

    // Typical warung shelf. Prices are sell prices in whole rupiah.
    let mut indomie_id = None;
    let mut teh_botol_id = None;

    let catalog: &[(&str, &str, i64, i64, i64, &str, &str)] = &[
        // (name, sku, cost, sell, stock, unit, category)
        ("Indomie Goreng", "IDM-GRG", 2800, 3500, 120, "pcs", "Makanan"),
        ("Teh Botol Sosro 350ml", "TBS-350", 2000, 2500, 48, "pcs", "Minuman"),
        ("Aqua 600ml", "AQU-600", 2500, 3000, 60, "pcs", "Minuman"),
        ("Beras Ramos 5kg", "BRS-5KG", 62000, 68000, 15, "sak", "Sembako"),
        ("Minyak Goreng Bimoli 1L", "MYK-1L", 16500, 18000, 24, "btl", "Sembako"),
        ("Gula Pasir 1kg", "GLA-1KG", 13500, 15000, 30, "kg", "Sembako"),
        ("Kopi Kapal Api Sachet", "KKA-SCH", 1200, 1500, 200, "pcs", "Minuman"),
        ("Sabun Lifebuoy", "SBN-LFB", 3500, 4500, 36, "pcs", "Kebutuhan"),
    ];

    for (name, sku, cost, sell, stock, unit, category) in catalog {
        let product = catalog_service
            .create_product(
                store_id,
                name,
                sku,
                Money::from_major(*cost),
                Money::from_major(*sell),
                *stock,
                unit,
                Some(category),
            )
            .await?;

        match *sku {
            "IDM-GRG" => indomie_id = Some(product.id),
            "TBS-350" => teh_botol_id = Some(product.id),
            _ => {}
        }
    }

    catalog_service
        .create_customer(store_id, "Budi Santoso", Some("081234567890"))
        .await?;
    catalog_service
        .create_customer(store_id, "Siti Aminah", None)
        .await?;

    // One sample paid sale through the real checkout path, so a fresh store
    // already shows a receipt: 2 × Indomie + 1 × Teh Botol = Rp 9.500.
    if let (Some(indomie_id), Some(teh_botol_id)) = (indomie_id, teh_botol_id) {
        let service = CheckoutService::without_replication(db.clone());
        let request = CheckoutRequest {
            store_id: store_id.to_string(),
            items: vec![
                CartLine {
                    product_id: indomie_id,
                    quantity: 2,
                    unit_price_cents: Money::from_major(3500),
                },
                CartLine {
                    product_id: teh_botol_id,
                    quantity: 1,
                    unit_price_cents: Money::from_major(2500),
                },
            ],
            payment_method: PaymentMethod::Cash,
            customer_name: None,
            discount_cents: Money::zero(),
            tax_cents: Money::zero(),
            notes: Some("Transaksi contoh".to_string()),
            cashier_id: "seed".to_string(),
            cashier_name: "Seeder".to_string(),
        };

        let sample = service
            .checkout(request)
            .await
            .map_err(|e| DbError::Internal(format!("sample transaction failed: {e}")))?;
        info!(number = %sample.transaction_number, "Sample transaction created");
    }

    info!(
        store_id = %store_id,
        products = catalog.len(),
        customers = 2,
        "Demo store seeded"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(seed_demo_store(&db, "store-1").await.unwrap());
        assert!(!seed_demo_store(&db, "store-1").await.unwrap());

        let count = db.products().count_by_store("store-1").await.unwrap();
        assert_eq!(count, 8);

        // The sample sale went through the real checkout path.
        let txns = db.transactions().list_by_store("store-1", 10).await.unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].formatted_total(), "Rp 9.500");

        // And it moved stock (Indomie seeded at 120, sold 2).
        let low = db.products().list_low_stock("store-1", 118).await.unwrap();
        assert!(low.iter().any(|p| p.sku == "IDM-GRG" && p.stock == 118));
    }

    #[tokio::test]
    async fn test_seed_is_per_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(seed_demo_store(&db, "store-1").await.unwrap());
        assert!(seed_demo_store(&db, "store-2").await.unwrap());
    }
}
