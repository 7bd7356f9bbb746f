//! Fixture catalog used by the `seed-data` binary and the integration tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, EntityTrait, Set,
    TransactionTrait,
};
use tracing::info;

use crate::{
    entities::product::{self, Category, Entity as Product},
    errors::ServiceError,
};

/// A product to insert; ids and timestamps are assigned on save.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: Decimal,
    pub category: Category,
    pub image: &'static str,
    pub stock: i32,
    pub rating: f64,
    pub reviews: i32,
    pub featured: bool,
}

impl SeedProduct {
    fn into_active_model(self) -> product::ActiveModel {
        product::ActiveModel {
            id: NotSet,
            name: Set(self.name.to_string()),
            description: Set(self.description.to_string()),
            price: Set(self.price),
            category: Set(self.category),
            image: Set(self.image.to_string()),
            stock: Set(self.stock),
            rating: Set(self.rating),
            reviews: Set(self.reviews),
            featured: Set(self.featured),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}

pub fn sample_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Wireless Headphones",
            description: "Comfortable over-ear wireless headphones with noise cancellation.",
            price: dec!(79.99),
            category: Category::Electronics,
            image: "https://example.com/images/headphones.jpg",
            stock: 25,
            rating: 4.3,
            reviews: 120,
            featured: true,
        },
        SeedProduct {
            name: "Organic Cotton T-Shirt",
            description: "Soft organic cotton t-shirt available in multiple colors.",
            price: dec!(19.99),
            category: Category::Clothing,
            image: "https://example.com/images/tshirt.jpg",
            stock: 100,
            rating: 4.6,
            reviews: 78,
            featured: false,
        },
        SeedProduct {
            name: "Coffee Table Book: Architecture",
            description: "Beautifully illustrated book on modern architecture.",
            price: dec!(29.50),
            category: Category::Books,
            image: "https://example.com/images/book.jpg",
            stock: 40,
            rating: 4.9,
            reviews: 45,
            featured: false,
        },
        SeedProduct {
            name: "Ceramic Vase",
            description: "Handmade ceramic vase for home decoration.",
            price: dec!(34.00),
            category: Category::Home,
            image: "https://example.com/images/vase.jpg",
            stock: 15,
            rating: 4.2,
            reviews: 10,
            featured: true,
        },
        SeedProduct {
            name: "Yoga Mat",
            description: "Non-slip, eco-friendly yoga mat for daily practice.",
            price: dec!(24.99),
            category: Category::Sports,
            image: "https://example.com/images/yogamat.jpg",
            stock: 60,
            rating: 4.5,
            reviews: 210,
            featured: false,
        },
        SeedProduct {
            name: "Building Blocks Set",
            description: "Colorful building blocks for ages 3 and up.",
            price: dec!(14.99),
            category: Category::Toys,
            image: "https://example.com/images/blocks.jpg",
            stock: 80,
            rating: 4.4,
            reviews: 55,
            featured: false,
        },
    ]
}

/// Replaces the catalog with [`sample_products`].
///
/// Carts and favorites are kept; entries pointing at a removed product
/// resolve with `product: null`. Everything runs in one transaction, so a
/// failed insert leaves the previous catalog in place.
pub async fn seed_database(db: &DatabaseConnection) -> Result<Vec<product::Model>, ServiceError> {
    let txn = db.begin().await?;

    let removed = Product::delete_many().exec(&txn).await?.rows_affected;
    info!(removed, "Cleared existing products");

    let mut created = Vec::new();
    for seed in sample_products() {
        created.push(seed.into_active_model().insert(&txn).await?);
    }

    txn.commit().await?;

    info!(count = created.len(), "Seeded products into the database");
    Ok(created)
}
