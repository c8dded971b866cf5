// src/models/order.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_negative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Paid,
    ];

    /// Allowed-transition table. PAID sits beside the shipping stages rather
    /// than inside them, so it is reachable from PENDING and PROCESSING and
    /// can move on to either.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Processing, Paid, Cancelled],
            Paid => &[Processing, Shipped, Cancelled],
            Processing => &[Paid, Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self == next || self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Paid => "PAID",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    /// `None` for guest orders.
    pub user_id: Option<Uuid>,
    pub status: OrderStatus,
    #[schema(example = "2999.80")]
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub billing_address: String,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub quantity: i32,
    /// Unit price captured when the order was placed.
    pub price: Decimal,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    #[schema(example = "CREDIT_CARD")]
    pub method: String,
    pub provider: Option<String>,
    pub transaction_id: Option<String>,
    /// Free-form provider status; not kept in step with `Order.status`.
    #[schema(example = "SUCCESS")]
    pub status: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Option<Payment>,
}

/// An order line priced at checkout time, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub variation_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

impl PricedLine {
    pub fn new(product_id: Uuid, variation_id: Option<Uuid>, quantity: i32, price: Decimal) -> Self {
        Self {
            product_id,
            variation_id,
            quantity,
            price,
            subtotal: price * Decimal::from(quantity),
        }
    }
}

pub fn order_total(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(|l| l.subtotal).sum()
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: Uuid,
    /// Omitted for products ordered without picking a variation.
    pub variation_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Adet en az 1 olmalıdır."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[validate(length(min = 1, message = "Sepet boş olamaz."), nested)]
    pub items: Vec<CheckoutItem>,
    #[validate(length(min = 1, message = "Teslimat adresi zorunludur."))]
    pub shipping_address: String,
    /// Falls back to the shipping address.
    pub billing_address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
    /// Skips the transition table. Admin override, logged.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShippingPayload {
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
    #[validate(length(min = 1, message = "Teslimat adresi boş olamaz."))]
    pub shipping_address: Option<String>,
    #[validate(length(min = 1, message = "Fatura adresi boş olamaz."))]
    pub billing_address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[validate(length(min = 1, message = "Ödeme yöntemi zorunludur."))]
    pub method: String,
    pub provider: Option<String>,
    pub transaction_id: Option<String>,
    #[validate(length(min = 1, message = "Ödeme durumu zorunludur."))]
    pub status: String,
    /// Defaults to the order total.
    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    #[param(inline)]
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn cancel_only_before_shipping() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
    }

    #[test]
    fn paid_is_a_sibling_state() {
        assert!(Pending.can_transition_to(Paid));
        assert!(Processing.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Processing));
        assert!(Paid.can_transition_to(Shipped));
        assert!(!Shipped.can_transition_to(Paid));
    }

    #[test]
    fn terminal_states_reject_everything_else() {
        for next in OrderStatus::ALL {
            if next != Delivered {
                assert!(!Delivered.can_transition_to(next), "DELIVERED -> {next}");
            }
            if next != Cancelled {
                assert!(!Cancelled.can_transition_to(next), "CANCELLED -> {next}");
            }
        }
        assert!(Delivered.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn same_state_is_a_no_op() {
        for status in OrderStatus::ALL {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn line_subtotal_is_price_times_quantity() {
        let line = PricedLine::new(Uuid::new_v4(), None, 3, Decimal::new(1999, 2));
        assert_eq!(line.subtotal, Decimal::new(5997, 2));

        let other = PricedLine::new(Uuid::new_v4(), None, 1, Decimal::new(1, 0));
        assert_eq!(order_total(&[line, other]), Decimal::new(6097, 2));
    }

    #[test]
    fn status_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&Paid).unwrap(), "\"PAID\"");
        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, Cancelled);
    }

    #[test]
    fn checkout_rejects_an_empty_cart_and_bad_lines() {
        let empty = CheckoutPayload { items: vec![], shipping_address: "Kadıköy, İstanbul".into(), billing_address: None };
        assert!(empty.validate().is_err());

        let line = |quantity| CheckoutItem { product_id: Uuid::new_v4(), variation_id: None, quantity };
        let zero = CheckoutPayload { items: vec![line(0)], shipping_address: "Kadıköy".into(), billing_address: None };
        assert!(zero.validate().is_err());

        let ok = CheckoutPayload { items: vec![line(2)], shipping_address: "Kadıköy".into(), billing_address: None };
        assert!(ok.validate().is_ok());
    }

}
