// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_negative;

/// Name of the variation synthesized for every new product.
pub const DEFAULT_VARIATION_NAME: &str = "Varsayılan";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Kablosuz Kulaklık")]
    pub name: String,
    #[schema(example = "kablosuz-kulaklik")]
    pub slug: String,
    pub description: Option<String>,
    #[schema(example = "1499.90")]
    pub price: Decimal,
    /// Fallback stock, used only while the product has no variations.
    pub stock: i32,
    pub featured: bool,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub url: String,
    pub alt: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(example = "Kırmızı / M")]
    pub name: String,
    #[schema(example = "KLK-RED-M")]
    pub sku: Option<String>,
    /// Overrides the product price when set.
    pub price: Option<Decimal>,
    pub stock: i32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionType {
    pub id: Uuid,
    #[schema(example = "Renk")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A concrete value of an option type ("Renk" -> "Kırmızı").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariationOption {
    pub id: Uuid,
    pub option_type_id: Uuid,
    #[schema(example = "Kırmızı")]
    pub value: String,
    pub created_at: DateTime<Utc>,
}

/// An option attached to a variation, joined with its type name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariationOptionValue {
    pub variation_id: Uuid,
    pub variation_option_id: Uuid,
    pub option_type_id: Uuid,
    pub option_type_name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariationWithOptions {
    #[serde(flatten)]
    pub variation: Variation,
    pub options: Vec<VariationOptionValue>,
}

/// A listing row: the product plus its derived stock.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub total_stock: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
    pub brand_name: String,
    pub images: Vec<ProductImage>,
    pub variations: Vec<VariationWithOptions>,
    pub total_stock: i64,
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    #[validate(length(min = 1, message = "Görsel adresi zorunludur."))]
    #[schema(example = "https://cdn.example.com/kulaklik-1.jpg")]
    pub url: String,
    pub alt: Option<String>,
}

/// Attaches the option value `variation_option_id`, declared to be of type
/// `option_type_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariationOptionInput {
    pub option_type_id: Uuid,
    pub variation_option_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariationPayload {
    #[validate(length(min = 1, message = "Varyasyon adı zorunludur."))]
    pub name: String,

    pub sku: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stok negatif olamaz."))]
    pub stock: i32,

    #[serde(default)]
    pub options: Vec<VariationOptionInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariationPayload {
    #[validate(length(min = 1, message = "Varyasyon adı boş olamaz."))]
    pub name: Option<String>,

    pub sku: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stok negatif olamaz."))]
    pub stock: Option<i32>,

    /// When present, replaces every option on the variation.
    pub options: Option<Vec<VariationOptionInput>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "Ürün adı zorunludur."))]
    pub name: String,

    pub slug: Option<String>,
    pub description: Option<String>,

    #[validate(required(message = "Fiyat zorunludur."), custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stok negatif olamaz."))]
    pub stock: Option<i32>,

    #[serde(default)]
    pub featured: bool,

    #[validate(required(message = "Kategori zorunludur."))]
    pub category_id: Option<Uuid>,

    #[validate(required(message = "Marka zorunludur."))]
    pub brand_id: Option<Uuid>,

    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImagePayload>,

    /// Explicit variations. When empty a default variation is synthesized.
    #[serde(default)]
    #[validate(nested)]
    pub variations: Vec<CreateVariationPayload>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "Ürün adı boş olamaz."))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stok negatif olamaz."))]
    pub stock: Option<i32>,

    pub featured: Option<bool>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,

    /// When present, replaces every image of the product.
    pub images: Option<Vec<ImagePayload>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionTypePayload {
    #[validate(length(min = 1, message = "Seçenek tipi adı zorunludur."))]
    #[schema(example = "Renk")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionValuePayload {
    #[validate(length(min = 1, message = "Seçenek değeri zorunludur."))]
    #[schema(example = "Kırmızı")]
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

/// Sparse listing filter; every field is optional.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub featured: Option<bool>,
    #[param(value_type = Option<f64>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<f64>)]
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    #[param(inline)]
    pub sort: Option<ProductSort>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Effective stock: the sum of the variation stocks when there are any,
/// otherwise the product's own stock field. Computed on read, never stored.
pub fn calculate_total_stock(product: &Product, variations: &[Variation]) -> i64 {
    if variations.is_empty() {
        i64::from(product.stock)
    } else {
        variations.iter().map(|v| i64::from(v.stock)).sum()
    }
}

/// Price a buyer pays for a variation: its override, else the product price.
pub fn effective_price(product: &Product, variation: Option<&Variation>) -> Decimal {
    variation.and_then(|v| v.price).unwrap_or(product.price)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn product(stock: i32, price: Decimal) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Kablosuz Kulaklık".into(),
            slug: "kablosuz-kulaklik".into(),
            description: None,
            price,
            stock,
            featured: false,
            category_id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            seo_title: None,
            seo_description: None,
            seo_keywords: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn variation(product_id: Uuid, stock: i32, price: Option<Decimal>) -> Variation {
        let now = Utc::now();
        Variation {
            id: Uuid::new_v4(),
            product_id,
            name: "Kırmızı".into(),
            sku: None,
            price,
            stock,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{product, variation};
    use super::*;

    #[test]
    fn total_stock_falls_back_to_product_stock() {
        let p = product(7, Decimal::new(100, 0));
        assert_eq!(calculate_total_stock(&p, &[]), 7);
    }

    #[test]
    fn total_stock_sums_variations_and_ignores_product_stock() {
        let p = product(999, Decimal::new(100, 0));
        let vs = vec![variation(p.id, 3, None), variation(p.id, 0, None), variation(p.id, 12, None)];
        assert_eq!(calculate_total_stock(&p, &vs), 15);
    }

    #[test]
    fn total_stock_does_not_overflow_on_large_variation_stocks() {
        let p = product(0, Decimal::new(100, 0));
        let vs = vec![variation(p.id, i32::MAX, None), variation(p.id, 1, None)];
        assert_eq!(calculate_total_stock(&p, &vs), i64::from(i32::MAX) + 1);
    }

    #[test]
    fn variation_price_overrides_product_price() {
        let p = product(0, Decimal::new(100, 0));
        let cheap = variation(p.id, 1, Some(Decimal::new(80, 0)));
        let plain = variation(p.id, 1, None);
        assert_eq!(effective_price(&p, Some(&cheap)), Decimal::new(80, 0));
        assert_eq!(effective_price(&p, Some(&plain)), Decimal::new(100, 0));
        assert_eq!(effective_price(&p, None), Decimal::new(100, 0));
    }
}
