// src/db/category_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::category::Category,
};

#[derive(Clone, Default)]
pub struct CategoryRepository;

impl CategoryRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(categories)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn find_by_slug<'e, E>(&self, executor: E, slug: &str) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn find_by_name<'e, E>(&self, executor: E, name: &str) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE LOWER(name) = LOWER($1) ORDER BY created_at LIMIT 1",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        slug: &str,
        description: Option<&str>,
        parent_id: Option<Uuid>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(parent_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Bu kategori slug'ı zaten kullanılıyor: {}", slug)))
    }

    /// `parent_id` is written as given: `Some(None)` detaches to the root.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
        parent_id: Option<Option<Uuid>>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name        = COALESCE($2, name),
                slug        = COALESCE($3, slug),
                description = COALESCE($4, description),
                parent_id   = CASE WHEN $5 THEN $6 ELSE parent_id END,
                updated_at  = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(parent_id.is_some())
        .bind(parent_id.flatten())
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            map_unique_violation(e, || format!("Bu kategori slug'ı zaten kullanılıyor: {}", slug.unwrap_or_default()))
        })?
        .ok_or_else(|| AppError::NotFound("Kategori".into()))
    }

    pub async fn count_children<'e, E>(&self, executor: E, id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
