// src/services/order_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::{order_repo::OrderFilter, OrderRepository, ProductRepository, VariationRepository},
    models::{
        order::{
            order_total, CheckoutItem, CheckoutPayload, Order, OrderDetail, OrderQuery, OrderStatus, Payment,
            PaymentPayload, PricedLine, UpdateShippingPayload,
        },
        product::{effective_price, Product, Variation},
    },
};

/// Prices every cart line against the current catalog. The unit price is
/// captured here and never recomputed afterwards.
pub fn price_lines(
    items: &[CheckoutItem],
    products: &HashMap<Uuid, Product>,
    variations: &HashMap<Uuid, Variation>,
) -> Result<Vec<PricedLine>, AppError> {
    items
        .iter()
        .map(|item| {
            let product = products
                .get(&item.product_id)
                .ok_or_else(|| AppError::NotFound(format!("Ürün ({})", item.product_id)))?;

            let variation = match item.variation_id {
                None => None,
                Some(id) => {
                    let variation = variations
                        .get(&id)
                        .ok_or_else(|| AppError::NotFound(format!("Varyasyon ({})", id)))?;
                    if variation.product_id != product.id {
                        return Err(AppError::validation(format!(
                            "Varyasyon {} bu ürüne ait değil: {}",
                            id, product.id
                        )));
                    }
                    Some(variation)
                }
            };

            Ok(PricedLine::new(
                product.id,
                item.variation_id,
                item.quantity,
                effective_price(product, variation),
            ))
        })
        .collect()
}

/// Decides whether a status change goes through. Returns `false` for a
/// same-state no-op.
pub fn check_transition(from: OrderStatus, to: OrderStatus, force: bool) -> Result<bool, AppError> {
    if from == to {
        return Ok(false);
    }
    if force || from.can_transition_to(to) {
        return Ok(true);
    }
    Err(AppError::InvalidStatusTransition { from, to })
}

#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    order_repo: OrderRepository,
    product_repo: ProductRepository,
    variation_repo: VariationRepository,
}

impl OrderService {
    pub fn new(
        pool: PgPool,
        order_repo: OrderRepository,
        product_repo: ProductRepository,
        variation_repo: VariationRepository,
    ) -> Self {
        Self { pool, order_repo, product_repo, variation_repo }
    }

    pub async fn checkout(&self, user_id: Option<Uuid>, payload: &CheckoutPayload) -> Result<OrderDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut products = HashMap::new();
        for item in &payload.items {
            if products.contains_key(&item.product_id) {
                continue;
            }
            if let Some(product) = self.product_repo.find_by_id(&mut *tx, item.product_id).await? {
                products.insert(product.id, product);
            }
        }

        let mut variations = HashMap::new();
        for variation_id in payload.items.iter().filter_map(|i| i.variation_id) {
            if let Some(variation) = self.variation_repo.find_by_id(&mut *tx, variation_id).await? {
                variations.insert(variation.id, variation);
            }
        }

        let lines = price_lines(&payload.items, &products, &variations)?;
        let total = order_total(&lines);

        let shipping = payload.shipping_address.trim();
        let billing = payload
            .billing_address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(shipping);

        let order = self.order_repo.create(&mut *tx, user_id, total, shipping, billing).await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            items.push(self.order_repo.add_item(&mut *tx, order.id, line).await?);
        }

        tx.commit().await?;

        tracing::info!(order_id = %order.id, %total, guest = user_id.is_none(), "order placed");
        Ok(OrderDetail { order, items, payment: None })
    }

    pub async fn list(&self, query: &OrderQuery) -> Result<Paginated<Order>, AppError> {
        let params = PageParams { page: query.page, limit: query.limit };
        let filter = OrderFilter { status: query.status, user_id: query.user_id };

        let total = self.order_repo.count(&self.pool, &filter).await?;
        let orders = self
            .order_repo
            .list(&self.pool, &filter, params.limit(), params.offset())
            .await?;

        Ok(Paginated::new(orders, params, total))
    }

    pub async fn list_for_user(&self, user_id: Uuid, params: PageParams) -> Result<Paginated<Order>, AppError> {
        self.list(&OrderQuery { user_id: Some(user_id), page: params.page, limit: params.limit, status: None })
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<OrderDetail, AppError> {
        let mut conn = self.pool.acquire().await?;

        let order = self
            .order_repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sipariş".into()))?;
        let items = self.order_repo.items_for(&mut *conn, id).await?;
        let payment = self.order_repo.find_payment(&mut *conn, id).await?;

        Ok(OrderDetail { order, items, payment })
    }

    pub async fn update_status(&self, id: Uuid, status: OrderStatus, force: bool) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sipariş".into()))?;

        if !check_transition(order.status, status, force)? {
            return Ok(order);
        }
        if force && !order.status.can_transition_to(status) {
            tracing::warn!(order_id = %id, from = %order.status, to = %status, "forced order status override");
        }

        let updated = self.order_repo.update_status(&mut *tx, id, status).await?;
        tx.commit().await?;

        tracing::info!(order_id = %id, from = %order.status, to = %status, "order status changed");
        Ok(updated)
    }

    pub async fn update_shipping(&self, id: Uuid, payload: &UpdateShippingPayload) -> Result<Order, AppError> {
        self.order_repo
            .update_shipping(
                &self.pool,
                id,
                payload.tracking_number.as_deref().map(str::trim),
                payload.estimated_delivery,
                payload.shipping_address.as_deref().map(str::trim),
                payload.billing_address.as_deref().map(str::trim),
            )
            .await
    }

    /// Creates or replaces the order's payment. Does not touch the order status.
    pub async fn upsert_payment(&self, order_id: Uuid, payload: &PaymentPayload) -> Result<Payment, AppError> {
        let order = self
            .order_repo
            .find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sipariş".into()))?;

        self.order_repo
            .upsert_payment(
                &self.pool,
                order_id,
                payload.method.trim(),
                payload.provider.as_deref(),
                payload.transaction_id.as_deref(),
                payload.status.trim(),
                payload.amount.unwrap_or(order.total_amount),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::{fixtures, UpdateProductPayload};
    use crate::services::test_support;
    use rust_decimal::Decimal;
    use OrderStatus::*;

    fn catalog() -> (HashMap<Uuid, Product>, HashMap<Uuid, Variation>, Uuid, Uuid) {
        let product = fixtures::product(0, Decimal::new(100, 0));
        let variation = fixtures::variation(product.id, 5, Some(Decimal::new(80, 0)));
        let (pid, vid) = (product.id, variation.id);
        (HashMap::from([(pid, product)]), HashMap::from([(vid, variation)]), pid, vid)
    }

    #[test]
    fn lines_snapshot_price_times_quantity() {
        let (products, variations, pid, vid) = catalog();
        let items = vec![
            CheckoutItem { product_id: pid, variation_id: Some(vid), quantity: 3 },
            CheckoutItem { product_id: pid, variation_id: None, quantity: 2 },
        ];

        let lines = price_lines(&items, &products, &variations).unwrap();
        assert_eq!(lines[0].price, Decimal::new(80, 0));
        assert_eq!(lines[0].subtotal, Decimal::new(240, 0));
        assert_eq!(lines[1].subtotal, Decimal::new(200, 0));
        assert_eq!(order_total(&lines), Decimal::new(440, 0));
    }

    #[test]
    fn snapshot_ignores_later_price_changes() {
        let (mut products, variations, pid, _) = catalog();
        let items = vec![CheckoutItem { product_id: pid, variation_id: None, quantity: 2 }];
        let lines = price_lines(&items, &products, &variations).unwrap();

        if let Some(p) = products.get_mut(&pid) {
            p.price = Decimal::new(999, 0);
        }
        assert_eq!(lines[0].price, Decimal::new(100, 0));
        assert_eq!(lines[0].subtotal, Decimal::new(200, 0));
    }

    #[test]
    fn unknown_product_or_foreign_variation_fails() {
        let (products, variations, _, vid) = catalog();

        let missing = vec![CheckoutItem { product_id: Uuid::new_v4(), variation_id: None, quantity: 1 }];
        assert!(matches!(price_lines(&missing, &products, &variations), Err(AppError::NotFound(_))));

        let other = fixtures::product(0, Decimal::ONE);
        let mut products = products;
        let other_id = other.id;
        products.insert(other_id, other);
        let foreign = vec![CheckoutItem { product_id: other_id, variation_id: Some(vid), quantity: 1 }];
        assert!(matches!(price_lines(&foreign, &products, &variations), Err(AppError::Validation(_))));
    }

    #[test]
    fn transition_table_is_enforced_unless_forced() {
        assert!(check_transition(Pending, Processing, false).unwrap());
        assert!(check_transition(Shipped, Delivered, false).unwrap());

        let err = check_transition(Delivered, Pending, false).unwrap_err();
        assert!(matches!(err, AppError::InvalidStatusTransition { from: Delivered, to: Pending }));

        assert!(check_transition(Delivered, Pending, true).unwrap());
    }

    #[test]
    fn same_state_is_a_no_op() {
        assert!(!check_transition(Cancelled, Cancelled, false).unwrap());
        assert!(!check_transition(Paid, Paid, true).unwrap());
    }

    #[sqlx::test]
    async fn stored_line_prices_survive_a_catalog_price_change(pool: PgPool) {
        let state = test_support::state(pool.clone());
        let product_id = test_support::seed_product(&state, "Klavye", Decimal::new(100, 0), &[]).await.product.id;

        let payload = CheckoutPayload {
            items: vec![CheckoutItem { product_id, variation_id: None, quantity: 2 }],
            shipping_address: "Kadıköy, İstanbul".into(),
            billing_address: None,
        };
        let placed = state.order_service.checkout(None, &payload).await.unwrap();
        assert_eq!(placed.order.total_amount, Decimal::new(200, 0));
        assert_eq!(placed.order.billing_address, "Kadıköy, İstanbul");

        let repriced = UpdateProductPayload { price: Some(Decimal::new(250, 0)), ..Default::default() };
        state.product_service.update(product_id, &repriced).await.unwrap();

        let subtotal: Decimal = sqlx::query_scalar("SELECT subtotal FROM order_items WHERE order_id = $1")
            .bind(placed.order.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(subtotal, Decimal::new(200, 0));

        let reloaded = state.order_service.get(placed.order.id).await.unwrap();
        assert_eq!(reloaded.items[0].price, Decimal::new(100, 0));
        assert_eq!(reloaded.order.total_amount, Decimal::new(200, 0));
    }
}
