// src/db/order_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::order::{Order, OrderItem, OrderStatus, Payment, PricedLine},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
}

fn push_order_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
}

#[derive(Clone, Default)]
pub struct OrderRepository;

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Option<Uuid>,
        total_amount: Decimal,
        shipping_address: &str,
        billing_address: &str,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, total_amount, shipping_address, billing_address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(total_amount)
        .bind(shipping_address)
        .bind(billing_address)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn add_item<'e, E>(&self, executor: E, order_id: Uuid, line: &PricedLine) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, variation_id, quantity, price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.variation_id)
        .bind(line.quantity)
        .bind(line.price)
        .bind(line.subtotal)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM orders");
        push_order_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id");
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let orders = qb.build_query_as::<Order>().fetch_all(executor).await?;
        Ok(orders)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &OrderFilter) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_order_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(total)
    }

    pub async fn items_for<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn update_status<'e, E>(&self, executor: E, id: Uuid, status: OrderStatus) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Sipariş".into()))
    }

    pub async fn update_shipping<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        tracking_number: Option<&str>,
        estimated_delivery: Option<NaiveDate>,
        shipping_address: Option<&str>,
        billing_address: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET
                tracking_number    = COALESCE($2, tracking_number),
                estimated_delivery = COALESCE($3, estimated_delivery),
                shipping_address   = COALESCE($4, shipping_address),
                billing_address    = COALESCE($5, billing_address),
                updated_at         = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tracking_number)
        .bind(estimated_delivery)
        .bind(shipping_address)
        .bind(billing_address)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Sipariş".into()))
    }

    pub async fn find_payment<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    /// One payment per order: inserts, or overwrites the existing row.
    pub async fn upsert_payment<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        method: &str,
        provider: Option<&str>,
        transaction_id: Option<&str>,
        status: &str,
        amount: Decimal,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (order_id, method, provider, transaction_id, status, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (order_id)
            DO UPDATE SET
                method         = EXCLUDED.method,
                provider       = EXCLUDED.provider,
                transaction_id = EXCLUDED.transaction_id,
                status         = EXCLUDED.status,
                amount         = EXCLUDED.amount,
                updated_at     = NOW()
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(method)
        .bind(provider)
        .bind(transaction_id)
        .bind(status)
        .bind(amount)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }
}
