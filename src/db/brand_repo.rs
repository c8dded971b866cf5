// src/db/brand_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::brand::Brand,
};

#[derive(Clone, Default)]
pub struct BrandRepository;

impl BrandRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brands = sqlx::query_as::<_, Brand>("SELECT * FROM brands ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(brands)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(brand)
    }

    pub async fn find_by_name<'e, E>(&self, executor: E, name: &str) -> Result<Option<Brand>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let brand = sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(executor)
            .await?;
        Ok(brand)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        slug: &str,
        description: Option<&str>,
        logo: Option<&str>,
    ) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (name, slug, description, logo)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(logo)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Bu marka zaten mevcut: {}", name)))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
        logo: Option<&str>,
    ) -> Result<Brand, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Brand>(
            r#"
            UPDATE brands SET
                name        = COALESCE($2, name),
                slug        = COALESCE($3, slug),
                description = COALESCE($4, description),
                logo        = COALESCE($5, logo),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(logo)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, || "Bu marka adı veya slug'ı zaten kullanılıyor".to_string()))?
        .ok_or_else(|| AppError::NotFound("Marka".into()))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
