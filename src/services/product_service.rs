// src/services/product_service.rs

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
        slug::{resolve_slug, slug_for},
    },
    db::{
        product_repo::{NewImage, NewProduct, ProductPatch},
        BrandRepository, CategoryRepository, ProductRepository, VariationRepository,
    },
    models::product::{
        calculate_total_stock, CreateProductPayload, CreateVariationPayload, ImagePayload, Product, ProductDetail,
        ProductFilter, ProductImage, ProductListItem, UpdateProductPayload, Variation, DEFAULT_VARIATION_NAME,
    },
    services::variation_service::{attach_options, VariationService},
};

/// Variations to insert alongside a new product. When the payload carries
/// none, a single default variation takes the product's price and stock.
pub fn variations_to_create(payload: &CreateProductPayload) -> Vec<(CreateVariationPayload, bool)> {
    if !payload.variations.is_empty() {
        return payload.variations.iter().cloned().map(|v| (v, false)).collect();
    }
    vec![(
        CreateVariationPayload {
            name: DEFAULT_VARIATION_NAME.to_string(),
            sku: None,
            price: payload.price,
            stock: payload.stock.unwrap_or(0),
            options: Vec::new(),
        },
        true,
    )]
}

fn to_new_images(images: &[ImagePayload]) -> Vec<NewImage> {
    images
        .iter()
        .map(|i| NewImage { url: i.url.trim().to_string(), alt: i.alt.clone() })
        .collect()
}

fn group_by_product<T>(rows: Vec<T>, key: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

#[derive(Clone)]
pub struct ProductService {
    pool: PgPool,
    product_repo: ProductRepository,
    variation_repo: VariationRepository,
    category_repo: CategoryRepository,
    brand_repo: BrandRepository,
    variation_service: VariationService,
}

impl ProductService {
    pub fn new(
        pool: PgPool,
        product_repo: ProductRepository,
        variation_repo: VariationRepository,
        category_repo: CategoryRepository,
        brand_repo: BrandRepository,
        variation_service: VariationService,
    ) -> Self {
        Self { pool, product_repo, variation_repo, category_repo, brand_repo, variation_service }
    }

    pub async fn list(&self, filter: &ProductFilter) -> Result<Paginated<ProductListItem>, AppError> {
        let params = PageParams { page: filter.page, limit: filter.limit };
        let mut conn = self.pool.acquire().await?;

        let total = self.product_repo.count(&mut *conn, filter).await?;
        let products = self
            .product_repo
            .list(&mut *conn, filter, params.limit(), params.offset())
            .await?;

        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let mut variations =
            group_by_product(self.variation_repo.list_for_products(&mut *conn, &ids).await?, |v| v.product_id);
        let mut images = group_by_product(self.product_repo.images_for(&mut *conn, &ids).await?, |i| i.product_id);

        let items = products
            .into_iter()
            .map(|product| {
                let product_variations = variations.remove(&product.id).unwrap_or_default();
                let total_stock = calculate_total_stock(&product, &product_variations);
                ProductListItem {
                    images: images.remove(&product.id).unwrap_or_default(),
                    total_stock,
                    product,
                }
            })
            .collect();

        Ok(Paginated::new(items, params, total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ProductDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let product = self
            .product_repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün".into()))?;
        self.detail(&mut conn, product).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<ProductDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let product = self
            .product_repo
            .find_by_slug(&mut *conn, slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün".into()))?;
        self.detail(&mut conn, product).await
    }

    async fn detail(&self, conn: &mut PgConnection, product: Product) -> Result<ProductDetail, AppError> {
        let category_name = self
            .category_repo
            .find_by_id(&mut *conn, product.category_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();
        let brand_name = self
            .brand_repo
            .find_by_id(&mut *conn, product.brand_id)
            .await?
            .map(|b| b.name)
            .unwrap_or_default();

        let images: Vec<ProductImage> = self.product_repo.images_for(&mut *conn, &[product.id]).await?;
        let variations: Vec<Variation> = self.variation_repo.list_for_products(&mut *conn, &[product.id]).await?;
        let total_stock = calculate_total_stock(&product, &variations);

        let ids: Vec<Uuid> = variations.iter().map(|v| v.id).collect();
        let options = self.variation_repo.options_for(&mut *conn, &ids).await?;

        Ok(ProductDetail {
            product,
            category_name,
            brand_name,
            images,
            variations: attach_options(variations, options),
            total_stock,
        })
    }

    pub async fn create(&self, payload: &CreateProductPayload) -> Result<ProductDetail, AppError> {
        let (Some(price), Some(category_id), Some(brand_id)) = (payload.price, payload.category_id, payload.brand_id)
        else {
            return Err(AppError::validation("Fiyat, kategori ve marka zorunludur."));
        };

        let mut tx = self.pool.begin().await?;

        self.category_repo
            .find_by_id(&mut *tx, category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Kategori".into()))?;
        self.brand_repo
            .find_by_id(&mut *tx, brand_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Marka".into()))?;

        let name = payload.name.trim();
        let slug = resolve_slug(payload.slug.as_deref(), name)?;
        if self.product_repo.find_by_slug(&mut *tx, &slug).await?.is_some() {
            return Err(AppError::Conflict(format!("Bu slug zaten kullanılıyor: {}", slug)));
        }

        let product = self
            .product_repo
            .create(
                &mut *tx,
                &NewProduct {
                    name,
                    slug: &slug,
                    description: payload.description.as_deref(),
                    price,
                    stock: payload.stock.unwrap_or(0),
                    featured: payload.featured,
                    category_id,
                    brand_id,
                    seo_title: payload.seo_title.as_deref(),
                    seo_description: payload.seo_description.as_deref(),
                    seo_keywords: payload.seo_keywords.as_deref(),
                },
            )
            .await?;

        for (position, image) in to_new_images(&payload.images).iter().enumerate() {
            self.product_repo
                .add_image(&mut *tx, product.id, image, position as i32)
                .await?;
        }

        for (variation, is_default) in variations_to_create(payload) {
            self.variation_service
                .create_in(&mut tx, product.id, &variation, is_default)
                .await?;
        }

        let detail = self.detail(&mut tx, product).await?;
        tx.commit().await?;

        tracing::info!(product_id = %detail.product.id, slug = %detail.product.slug, "product created");
        Ok(detail)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateProductPayload) -> Result<ProductDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .product_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün".into()))?;

        if let Some(category_id) = payload.category_id {
            self.category_repo
                .find_by_id(&mut *tx, category_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Kategori".into()))?;
        }
        if let Some(brand_id) = payload.brand_id {
            self.brand_repo
                .find_by_id(&mut *tx, brand_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Marka".into()))?;
        }

        let slug = payload
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(slug_for)
            .transpose()?
            .filter(|s| *s != current.slug);
        if let Some(slug) = &slug {
            if self.product_repo.find_by_slug(&mut *tx, slug).await?.is_some() {
                return Err(AppError::Conflict(format!("Bu slug zaten kullanılıyor: {}", slug)));
            }
        }

        let patch = ProductPatch {
            name: payload.name.as_deref().map(str::trim).map(String::from),
            slug,
            description: payload.description.clone(),
            price: payload.price,
            stock: payload.stock,
            featured: payload.featured,
            category_id: payload.category_id,
            brand_id: payload.brand_id,
            seo_title: payload.seo_title.clone(),
            seo_description: payload.seo_description.clone(),
            seo_keywords: payload.seo_keywords.clone(),
        };
        let product = self.product_repo.update(&mut *tx, id, &patch).await?;

        // Price and stock edits on the product follow through to its default variation.
        if payload.price.is_some() || payload.stock.is_some() {
            if let Some(default) = self.variation_repo.find_default(&mut *tx, id).await? {
                self.variation_repo
                    .update(&mut *tx, default.id, None, None, payload.price, payload.stock)
                    .await?;
            }
        }

        if let Some(images) = &payload.images {
            self.product_repo.delete_images(&mut *tx, id).await?;
            for (position, image) in to_new_images(images).iter().enumerate() {
                self.product_repo.add_image(&mut *tx, id, image, position as i32).await?;
            }
        }

        let detail = self.detail(&mut tx, product).await?;
        tx.commit().await?;
        Ok(detail)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.product_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün".into()))?;

        self.product_repo.delete_images(&mut *tx, id).await?;
        self.product_repo.delete_seller_links(&mut *tx, id).await?;
        self.variation_repo.unlink_options_for_product(&mut *tx, id).await?;
        self.variation_repo.delete_for_product(&mut *tx, id).await?;
        self.product_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use rust_decimal::Decimal;

    fn payload() -> CreateProductPayload {
        CreateProductPayload {
            name: "Kablosuz Kulaklık".into(),
            price: Some(Decimal::new(149990, 2)),
            stock: Some(12),
            category_id: Some(Uuid::new_v4()),
            brand_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
    }

    #[test]
    fn product_without_variations_gets_a_default_one() {
        let payload = payload();
        let planned = variations_to_create(&payload);

        assert_eq!(planned.len(), 1);
        let (variation, is_default) = &planned[0];
        assert!(is_default);
        assert_eq!(variation.name, DEFAULT_VARIATION_NAME);
        assert_eq!(variation.price, Some(Decimal::new(149990, 2)));
        assert_eq!(variation.stock, 12);
        assert!(variation.sku.is_none());
    }

    #[test]
    fn missing_stock_defaults_to_zero_on_the_default_variation() {
        let payload = CreateProductPayload { stock: None, ..payload() };
        assert_eq!(variations_to_create(&payload)[0].0.stock, 0);
    }

    #[test]
    fn explicit_variations_are_kept_as_given() {
        let mut payload = payload();
        payload.variations = vec![
            CreateVariationPayload {
                name: "Siyah".into(),
                sku: Some("KLK-SIYAH".into()),
                price: None,
                stock: 4,
                options: vec![],
            },
            CreateVariationPayload {
                name: "Beyaz".into(),
                sku: Some("KLK-BEYAZ".into()),
                price: Some(Decimal::new(159990, 2)),
                stock: 2,
                options: vec![],
            },
        ];

        let planned = variations_to_create(&payload);
        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|(_, is_default)| !is_default));
        assert_eq!(planned[1].0.name, "Beyaz");
    }

    #[test]
    fn images_keep_payload_order() {
        let images = vec![
            ImagePayload { url: " https://cdn/a.jpg ".into(), alt: None },
            ImagePayload { url: "https://cdn/b.jpg".into(), alt: Some("B".into()) },
        ];
        let new = to_new_images(&images);
        assert_eq!(new[0].url, "https://cdn/a.jpg");
        assert_eq!(new[1].alt.as_deref(), Some("B"));
    }

    #[sqlx::test]
    async fn deleting_a_product_removes_its_images_and_variations(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let detail = test_support::seed_product(
            &state,
            "Kablosuz Kulaklık",
            Decimal::new(1000, 0),
            &["https://cdn/a.jpg", "https://cdn/b.jpg"],
        )
        .await;
        let id = detail.product.id;
        assert_eq!(detail.images.len(), 2);
        assert_eq!(detail.variations.len(), 1);

        state.product_service.delete(id).await.unwrap();

        let images: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_images WHERE product_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        let variations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variations WHERE product_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(images, 0);
        assert_eq!(variations, 0);
        assert!(matches!(state.product_service.get_by_id(id).await, Err(AppError::NotFound(_))));
    }
}
