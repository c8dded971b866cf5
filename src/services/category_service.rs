// src/services/category_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, slug::{resolve_slug, slug_for}},
    db::{CategoryRepository, ProductRepository},
    models::category::{
        build_tree, would_create_cycle, Category, CategoryNode, CreateCategoryPayload, UpdateCategoryPayload,
    },
};

/// Rejects a new parent that is the category itself or one of its descendants.
pub fn check_parent(all: &[Category], category_id: Uuid, new_parent: Option<Uuid>) -> Result<(), AppError> {
    match new_parent {
        Some(parent) if parent == category_id => {
            Err(AppError::validation("Bir kategori kendisinin üst kategorisi olamaz."))
        }
        Some(parent) if would_create_cycle(all, category_id, parent) => Err(AppError::validation(
            "Üst kategori, kategorinin kendi alt kategorilerinden biri olamaz.",
        )),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct CategoryService {
    pool: PgPool,
    category_repo: CategoryRepository,
    product_repo: ProductRepository,
}

impl CategoryService {
    pub fn new(pool: PgPool, category_repo: CategoryRepository, product_repo: ProductRepository) -> Self {
        Self { pool, category_repo, product_repo }
    }

    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        self.category_repo.list(&self.pool).await
    }

    pub async fn tree(&self) -> Result<Vec<CategoryNode>, AppError> {
        Ok(build_tree(self.category_repo.list(&self.pool).await?))
    }

    pub async fn get(&self, id: Uuid) -> Result<Category, AppError> {
        self.category_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Kategori".into()))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, AppError> {
        self.category_repo
            .find_by_slug(&self.pool, slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Kategori".into()))
    }

    pub async fn create(&self, payload: &CreateCategoryPayload) -> Result<Category, AppError> {
        if let Some(parent_id) = payload.parent_id {
            self.get(parent_id).await?;
        }

        let name = payload.name.trim();
        let slug = resolve_slug(payload.slug.as_deref(), name)?;

        let category = self
            .category_repo
            .create(&self.pool, name, &slug, payload.description.as_deref(), payload.parent_id)
            .await?;

        tracing::info!(category_id = %category.id, %slug, "category created");
        Ok(category)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateCategoryPayload) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;

        self.category_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Kategori".into()))?;

        if let Some(Some(parent_id)) = payload.parent_id {
            self.category_repo
                .find_by_id(&mut *tx, parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Üst kategori".into()))?;
            let all = self.category_repo.list(&mut *tx).await?;
            check_parent(&all, id, Some(parent_id))?;
        }

        let slug = payload
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(slug_for)
            .transpose()?;

        let category = self
            .category_repo
            .update(
                &mut *tx,
                id,
                payload.name.as_deref().map(str::trim),
                slug.as_deref(),
                payload.description.as_deref(),
                payload.parent_id,
            )
            .await?;

        tx.commit().await?;
        Ok(category)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.category_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Kategori".into()))?;

        if self.category_repo.count_children(&mut *tx, id).await? > 0 {
            return Err(AppError::Conflict("Alt kategorileri olan bir kategori silinemez.".into()));
        }
        if self.product_repo.count_in_category(&mut *tx, id).await? > 0 {
            return Err(AppError::Conflict("Ürünleri olan bir kategori silinemez.".into()));
        }

        self.category_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(parent_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            name: "Kategori".into(),
            slug: "kategori".into(),
            description: None,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn category_cannot_parent_itself() {
        let root = category(None);
        let err = check_parent(&[root.clone()], root.id, Some(root.id)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn descendant_cannot_become_parent() {
        let root = category(None);
        let child = category(Some(root.id));
        let grandchild = category(Some(child.id));
        let all = vec![root.clone(), child.clone(), grandchild.clone()];

        assert!(check_parent(&all, root.id, Some(grandchild.id)).is_err());
        assert!(check_parent(&all, grandchild.id, Some(root.id)).is_ok());
        assert!(check_parent(&all, child.id, None).is_ok());
    }
}
