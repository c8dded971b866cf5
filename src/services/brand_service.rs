// src/services/brand_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, slug::{resolve_slug, slug_for}},
    db::{BrandRepository, ProductRepository},
    models::brand::{Brand, CreateBrandPayload, UpdateBrandPayload},
};

#[derive(Clone)]
pub struct BrandService {
    pool: PgPool,
    brand_repo: BrandRepository,
    product_repo: ProductRepository,
}

impl BrandService {
    pub fn new(pool: PgPool, brand_repo: BrandRepository, product_repo: ProductRepository) -> Self {
        Self { pool, brand_repo, product_repo }
    }

    pub async fn list(&self) -> Result<Vec<Brand>, AppError> {
        self.brand_repo.list(&self.pool).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Brand, AppError> {
        self.brand_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Marka".into()))
    }

    pub async fn create(&self, payload: &CreateBrandPayload) -> Result<Brand, AppError> {
        let name = payload.name.trim();
        if self.brand_repo.find_by_name(&self.pool, name).await?.is_some() {
            return Err(AppError::Conflict(format!("Bu marka zaten mevcut: {}", name)));
        }

        let slug = resolve_slug(payload.slug.as_deref(), name)?;

        let brand = self
            .brand_repo
            .create(&self.pool, name, &slug, payload.description.as_deref(), payload.logo.as_deref())
            .await?;

        tracing::info!(brand_id = %brand.id, %slug, "brand created");
        Ok(brand)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateBrandPayload) -> Result<Brand, AppError> {
        let slug = payload
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(slug_for)
            .transpose()?;

        self.brand_repo
            .update(
                &self.pool,
                id,
                payload.name.as_deref().map(str::trim),
                slug.as_deref(),
                payload.description.as_deref(),
                payload.logo.as_deref(),
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if self.product_repo.count_for_brand(&mut *tx, id).await? > 0 {
            return Err(AppError::Conflict("Ürünleri olan bir marka silinemez.".into()));
        }
        if self.brand_repo.delete(&mut *tx, id).await? == 0 {
            return Err(AppError::NotFound("Marka".into()));
        }

        tx.commit().await?;
        tracing::info!(brand_id = %id, "brand deleted");
        Ok(())
    }
}
