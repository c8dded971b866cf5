// src/services/test_support.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    config::{AppState, Config},
    models::{
        brand::CreateBrandPayload,
        category::CreateCategoryPayload,
        product::{CreateProductPayload, ImagePayload, ProductDetail},
    },
};

/// Services wired around a pool handed out by `#[sqlx::test]`.
pub fn state(pool: PgPool) -> AppState {
    let config = Config {
        database_url: String::new(),
        jwt_secret: "test-secret".into(),
        bind_addr: ([127, 0, 0, 1], 0).into(),
        db_max_connections: 1,
        site_name: "Test Mağaza".into(),
        public_url: "http://localhost".into(),
    };
    AppState::with_pool(pool, config)
}

/// Stores a product under a fresh category and brand.
pub async fn seed_product(state: &AppState, name: &str, price: Decimal, images: &[&str]) -> ProductDetail {
    let category = state
        .category_service
        .create(&CreateCategoryPayload {
            name: format!("{name} Kategori"),
            slug: None,
            description: None,
            parent_id: None,
        })
        .await
        .unwrap();
    let brand = state
        .brand_service
        .create(&CreateBrandPayload { name: format!("{name} Marka"), slug: None, description: None, logo: None })
        .await
        .unwrap();

    state
        .product_service
        .create(&CreateProductPayload {
            name: name.into(),
            price: Some(price),
            stock: Some(10),
            category_id: Some(category.id),
            brand_id: Some(brand.id),
            images: images.iter().map(|url| ImagePayload { url: url.to_string(), alt: None }).collect(),
            ..Default::default()
        })
        .await
        .unwrap()
}
