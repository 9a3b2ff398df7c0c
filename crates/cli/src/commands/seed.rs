//! Demo data for a fresh database.
//!
//! Safe to run repeatedly: categories are matched by their unique name,
//! products and stores by name, and existing rows are left untouched.

use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use emporium_admin::db;

use super::database_url;

/// A demo product: name, category, description, price in cents, stock.
struct SeedProduct {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    price_cents: i64,
    stock: i32,
}

const CATEGORIES: [&str; 4] = ["Preserves", "Spirits", "Honey", "Spices"];

const PRODUCTS: [SeedProduct; 8] = [
    SeedProduct {
        name: "Ajvar 550g",
        category: "Preserves",
        description: "Roasted red pepper relish, slow cooked.",
        price_cents: 280_00,
        stock: 40,
    },
    SeedProduct {
        name: "Fig jam 370g",
        category: "Preserves",
        description: "Whole figs from the south.",
        price_cents: 220_00,
        stock: 25,
    },
    SeedProduct {
        name: "Grape rakija 0.7l",
        category: "Spirits",
        description: "Double distilled, aged one year.",
        price_cents: 750_00,
        stock: 12,
    },
    SeedProduct {
        name: "Plum rakija 0.5l",
        category: "Spirits",
        description: "Traditional plum brandy.",
        price_cents: 620_00,
        stock: 4,
    },
    SeedProduct {
        name: "Meadow honey 900g",
        category: "Honey",
        description: "Raw multifloral honey.",
        price_cents: 600_00,
        stock: 30,
    },
    SeedProduct {
        name: "Acacia honey 450g",
        category: "Honey",
        description: "Light and mild.",
        price_cents: 390_00,
        stock: 3,
    },
    SeedProduct {
        name: "Sweet paprika 100g",
        category: "Spices",
        description: "Sun dried and ground.",
        price_cents: 120_00,
        stock: 60,
    },
    SeedProduct {
        name: "Mountain tea 50g",
        category: "Spices",
        description: "Hand picked sideritis.",
        price_cents: 150_00,
        stock: 18,
    },
];

const STORES: [(&str, &str); 2] = [
    ("Emporium Centar", "Makedonija 12, Skopje"),
    ("Emporium Bitola", "Shirok Sokak 45, Bitola"),
];

/// Counts of rows inserted by a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
struct SeedReport {
    categories: u64,
    products: u64,
    stores: u64,
}

/// Insert demo categories, products and stores.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn catalog() -> Result<(), Box<dyn std::error::Error>> {
    let url = database_url("STOREFRONT_DATABASE_URL")
        .map_err(|var| format!("{var} (or DATABASE_URL) not set"))?;

    let pool = db::create_pool(&url).await?;
    let mut tx = pool.begin().await?;
    let report = seed(&mut tx).await?;
    tx.commit().await?;

    tracing::info!("Seeding complete!");
    tracing::info!("  Categories inserted: {}", report.categories);
    tracing::info!("  Products inserted: {}", report.products);
    tracing::info!("  Stores inserted: {}", report.stores);
    Ok(())
}

async fn seed(tx: &mut Transaction<'_, Postgres>) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    for name in CATEGORIES {
        report.categories += sqlx::query(
            "INSERT INTO shop.category (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }

    for product in &PRODUCTS {
        report.products += sqlx::query(
            "INSERT INTO shop.product (name, description, price, stock_quantity, category_id) \
             SELECT $1, $2, $3, $4, c.id FROM shop.category c WHERE c.name = $5 \
             AND NOT EXISTS (SELECT 1 FROM shop.product p WHERE p.name = $1 AND NOT p.is_deleted)",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(Decimal::new(product.price_cents, 2))
        .bind(product.stock)
        .bind(product.category)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }

    for (name, location) in STORES {
        report.stores += sqlx::query(
            "INSERT INTO shop.store (name, location) SELECT $1, $2 \
             WHERE NOT EXISTS (SELECT 1 FROM shop.store WHERE name = $1)",
        )
        .bind(name)
        .bind(location)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_products_reference_known_categories() {
        for product in &PRODUCTS {
            assert!(
                CATEGORIES.contains(&product.category),
                "{} has unknown category {}",
                product.name,
                product.category
            );
        }
    }

    #[test]
    fn test_seed_names_are_unique() {
        let names: HashSet<_> = PRODUCTS.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), PRODUCTS.len());
        let stores: HashSet<_> = STORES.iter().map(|(name, _)| name).collect();
        assert_eq!(stores.len(), STORES.len());
    }

    #[test]
    fn test_seed_includes_low_stock_items() {
        assert!(PRODUCTS.iter().any(|p| p.stock <= 5));
        assert!(PRODUCTS.iter().all(|p| p.price_cents > 0 && p.stock >= 0));
    }
}
