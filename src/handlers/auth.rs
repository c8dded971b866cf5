// src/handlers/auth.rs

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum::Json;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::PageParams, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, User},
        order::Order,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Müşteri hesabı oluşturuldu", body = AuthResponse),
        (status = 400, description = "Geçersiz veri"),
        (status = 409, description = "E-posta zaten kayıtlı")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let token = app_state.auth_service.register_user(&payload).await?;

    Ok(ApiResponse::with_message(AuthResponse { token }, "Kayıt başarılı").created())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Giriş başarılı", body = AuthResponse),
        (status = 401, description = "E-posta veya şifre hatalı")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(ApiResponse::ok(AuthResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Oturumdaki kullanıcı", body = User)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> ApiResponse<User> {
    ApiResponse::ok(user)
}

#[utoipa::path(
    get,
    path = "/api/auth/me/orders",
    tag = "Auth",
    params(PageParams),
    responses((status = 200, description = "Kullanıcının siparişleri (sayfalı)", body = [Order])),
    security(("api_jwt" = []))
)]
pub async fn my_orders(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.order_service.list_for_user(user.id, params).await?;
    Ok(Json(page))
}
