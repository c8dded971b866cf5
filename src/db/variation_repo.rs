// src/db/variation_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::product::{OptionType, Variation, VariationOption, VariationOptionValue},
};

#[derive(Clone, Default)]
pub struct VariationRepository;

impl VariationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_for_products<'e, E>(&self, executor: E, product_ids: &[Uuid]) -> Result<Vec<Variation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variations = sqlx::query_as::<_, Variation>(
            r#"
            SELECT * FROM variations
            WHERE product_id = ANY($1)
            ORDER BY is_default DESC, created_at ASC
            "#,
        )
        .bind(product_ids)
        .fetch_all(executor)
        .await?;
        Ok(variations)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Variation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variation = sqlx::query_as::<_, Variation>("SELECT * FROM variations WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(variation)
    }

    /// Case-insensitive SKU lookup.
    pub async fn find_by_sku<'e, E>(&self, executor: E, sku: &str) -> Result<Option<Variation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variation = sqlx::query_as::<_, Variation>("SELECT * FROM variations WHERE LOWER(sku) = LOWER($1)")
            .bind(sku)
            .fetch_optional(executor)
            .await?;
        Ok(variation)
    }

    pub async fn find_default<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Option<Variation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variation = sqlx::query_as::<_, Variation>(
            "SELECT * FROM variations WHERE product_id = $1 AND is_default ORDER BY created_at LIMIT 1",
        )
        .bind(product_id)
        .fetch_optional(executor)
        .await?;
        Ok(variation)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        name: &str,
        sku: Option<&str>,
        price: Option<Decimal>,
        stock: i32,
        is_default: bool,
    ) -> Result<Variation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Variation>(
            r#"
            INSERT INTO variations (product_id, name, sku, price, stock, is_default)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(name)
        .bind(sku)
        .bind(price)
        .bind(stock)
        .bind(is_default)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Bu SKU zaten kullanılıyor: {}", sku.unwrap_or_default())))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        sku: Option<&str>,
        price: Option<Decimal>,
        stock: Option<i32>,
    ) -> Result<Variation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Variation>(
            r#"
            UPDATE variations SET
                name       = COALESCE($2, name),
                sku        = COALESCE($3, sku),
                price      = COALESCE($4, price),
                stock      = COALESCE($5, stock),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(sku)
        .bind(price)
        .bind(stock)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Bu SKU zaten kullanılıyor: {}", sku.unwrap_or_default())))?
        .ok_or_else(|| AppError::NotFound("Varyasyon".into()))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM variations WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_product<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM variations WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Options attached to variations
    // ---

    pub async fn options_for<'e, E>(
        &self,
        executor: E,
        variation_ids: &[Uuid],
    ) -> Result<Vec<VariationOptionValue>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let options = sqlx::query_as::<_, VariationOptionValue>(
            r#"
            SELECT
                l.variation_id,
                l.variation_option_id,
                l.option_type_id,
                t.name AS option_type_name,
                o.value
            FROM variation_option_links l
            JOIN variation_options o ON o.id = l.variation_option_id
            JOIN option_types t ON t.id = l.option_type_id
            WHERE l.variation_id = ANY($1)
            ORDER BY t.name ASC
            "#,
        )
        .bind(variation_ids)
        .fetch_all(executor)
        .await?;
        Ok(options)
    }

    pub async fn link_option<'e, E>(
        &self,
        executor: E,
        variation_id: Uuid,
        variation_option_id: Uuid,
        option_type_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO variation_option_links (variation_id, variation_option_id, option_type_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(variation_id)
        .bind(variation_option_id)
        .bind(option_type_id)
        .execute(executor)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Seçenek birden fazla kez verildi: {}", variation_option_id)))?;
        Ok(())
    }

    pub async fn unlink_options<'e, E>(&self, executor: E, variation_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM variation_option_links WHERE variation_id = $1")
            .bind(variation_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn unlink_options_for_product<'e, E>(&self, executor: E, product_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM variation_option_links
            WHERE variation_id IN (SELECT id FROM variations WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Option catalog
    // ---

    pub async fn list_option_types<'e, E>(&self, executor: E) -> Result<Vec<OptionType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let types = sqlx::query_as::<_, OptionType>("SELECT * FROM option_types ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(types)
    }

    pub async fn create_option_type<'e, E>(&self, executor: E, name: &str) -> Result<OptionType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OptionType>("INSERT INTO option_types (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, || format!("Seçenek tipi zaten mevcut: {}", name)))
    }

    pub async fn find_option_type<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<OptionType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let option_type = sqlx::query_as::<_, OptionType>("SELECT * FROM option_types WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(option_type)
    }

    pub async fn list_option_values<'e, E>(
        &self,
        executor: E,
        option_type_id: Uuid,
    ) -> Result<Vec<VariationOption>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let values = sqlx::query_as::<_, VariationOption>(
            "SELECT * FROM variation_options WHERE option_type_id = $1 ORDER BY value ASC",
        )
        .bind(option_type_id)
        .fetch_all(executor)
        .await?;
        Ok(values)
    }

    pub async fn create_option_value<'e, E>(
        &self,
        executor: E,
        option_type_id: Uuid,
        value: &str,
    ) -> Result<VariationOption, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VariationOption>(
            "INSERT INTO variation_options (option_type_id, value) VALUES ($1, $2) RETURNING *",
        )
        .bind(option_type_id)
        .bind(value)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Seçenek değeri zaten mevcut: {}", value)))
    }

    pub async fn find_option_values<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<VariationOption>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let values = sqlx::query_as::<_, VariationOption>("SELECT * FROM variation_options WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(values)
    }
}
