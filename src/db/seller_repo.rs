// src/db/seller_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::auth::{ProductSeller, SellerSummary},
};

#[derive(Clone, Default)]
pub struct SellerRepository;

impl SellerRepository {
    pub fn new() -> Self {
        Self
    }

    /// CUSTOMER users that own at least one product-seller row.
    pub async fn list_sellers<'e, E>(&self, executor: E) -> Result<Vec<SellerSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sellers = sqlx::query_as::<_, SellerSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.phone, COUNT(ps.id) AS product_count
            FROM users u
            JOIN product_sellers ps ON ps.seller_id = u.id
            WHERE u.role = 'CUSTOMER'
            GROUP BY u.id
            ORDER BY u.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(sellers)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        product_id: Option<Uuid>,
        seller_id: Option<Uuid>,
    ) -> Result<Vec<ProductSeller>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ProductSeller>(
            r#"
            SELECT * FROM product_sellers
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR seller_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .bind(seller_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ProductSeller>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ProductSeller>("SELECT * FROM product_sellers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        seller_id: Uuid,
        price: Decimal,
        stock: i32,
    ) -> Result<ProductSeller, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ProductSeller>(
            r#"
            INSERT INTO product_sellers (product_id, seller_id, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(seller_id)
        .bind(price)
        .bind(stock)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || "Bu satıcı bu ürün için zaten kayıtlı".to_string()))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        price: Option<Decimal>,
        stock: Option<i32>,
    ) -> Result<ProductSeller, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ProductSeller>(
            r#"
            UPDATE product_sellers SET
                price      = COALESCE($2, price),
                stock      = COALESCE($3, stock),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(price)
        .bind(stock)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Ürün satıcısı".into()))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_sellers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
