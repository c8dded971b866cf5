// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::MaybeUser,
    models::order::{
        CheckoutPayload, Order, OrderDetail, OrderQuery, Payment, PaymentPayload, UpdateOrderStatusPayload,
        UpdateShippingPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CheckoutPayload,
    responses(
        (status = 201, description = "Sipariş oluşturuldu (PENDING)", body = OrderDetail),
        (status = 400, description = "Sepet geçersiz"),
        (status = 404, description = "Ürün veya varyasyon bulunamadı")
    ),
    security((), ("api_jwt" = []))
)]
pub async fn checkout(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<CheckoutPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let order = app_state
        .order_service
        .checkout(user.map(|u| u.id), &payload)
        .await?;

    Ok(ApiResponse::with_message(order, "Siparişiniz alındı").created())
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Orders",
    params(OrderQuery),
    responses((status = 200, description = "Sayfalı sipariş listesi", body = [Order])),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.order_service.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Sipariş ID")),
    responses(
        (status = 200, description = "Sipariş, kalemleri ve ödeme bilgisi", body = OrderDetail),
        (status = 404, description = "Sipariş bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<OrderDetail>, AppError> {
    Ok(ApiResponse::ok(app_state.order_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Sipariş ID")),
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Durum güncellendi", body = Order),
        (status = 400, description = "İzin verilmeyen durum geçişi"),
        (status = 404, description = "Sipariş bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<ApiResponse<Order>, AppError> {
    let order = app_state
        .order_service
        .update_status(id, payload.status, payload.force)
        .await?;
    Ok(ApiResponse::with_message(order, "Sipariş durumu güncellendi"))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/shipping",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Sipariş ID")),
    request_body = UpdateShippingPayload,
    responses(
        (status = 200, description = "Kargo bilgisi güncellendi", body = Order),
        (status = 404, description = "Sipariş bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_shipping(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShippingPayload>,
) -> Result<ApiResponse<Order>, AppError> {
    payload.validate()?;

    let order = app_state.order_service.update_shipping(id, &payload).await?;
    Ok(ApiResponse::with_message(order, "Kargo bilgisi güncellendi"))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/payment",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Sipariş ID")),
    request_body = PaymentPayload,
    responses(
        (status = 200, description = "Ödeme kaydı oluşturuldu veya güncellendi", body = Payment),
        (status = 404, description = "Sipariş bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_order_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentPayload>,
) -> Result<ApiResponse<Payment>, AppError> {
    payload.validate()?;

    let payment = app_state.order_service.upsert_payment(id, &payload).await?;
    Ok(ApiResponse::ok(payment))
}
