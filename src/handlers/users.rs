// src/handlers/users.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin},
    models::auth::{
        CreateProductSellerPayload, CreateUserPayload, ProductSeller, ProductSellerQuery, SellerSummary,
        UpdateProductSellerPayload, UpdateUserPayload, User, UserQuery,
    },
};

// --- USERS (ADMIN only) ---

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Users",
    params(UserQuery),
    responses(
        (status = 200, description = "Sayfalı kullanıcı listesi", body = [User]),
        (status = 403, description = "Yalnızca ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.user_service.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "Kullanıcı ID")),
    responses(
        (status = 200, description = "Kullanıcı", body = User),
        (status = 404, description = "Kullanıcı bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<User>, AppError> {
    Ok(ApiResponse::ok(app_state.user_service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Kullanıcı oluşturuldu", body = User),
        (status = 409, description = "E-posta kullanımda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let user = app_state.user_service.create(&payload).await?;
    Ok(ApiResponse::with_message(user, "Kullanıcı oluşturuldu").created())
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "Kullanıcı ID")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Kullanıcı güncellendi", body = User),
        (status = 404, description = "Kullanıcı bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<ApiResponse<User>, AppError> {
    payload.validate()?;

    let user = app_state.user_service.update(id, &payload).await?;
    Ok(ApiResponse::with_message(user, "Kullanıcı güncellendi"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "Kullanıcı ID")),
    responses(
        (status = 204, description = "Kullanıcı silindi"),
        (status = 409, description = "Satıcı kaydı olan kullanıcı silinemez")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- SELLERS ---

#[utoipa::path(
    get,
    path = "/api/admin/sellers",
    tag = "Sellers",
    responses((status = 200, description = "Ürün satan müşteriler", body = [SellerSummary])),
    security(("api_jwt" = []))
)]
pub async fn list_sellers(State(app_state): State<AppState>) -> Result<ApiResponse<Vec<SellerSummary>>, AppError> {
    Ok(ApiResponse::ok(app_state.user_service.list_sellers().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/product-sellers",
    tag = "Sellers",
    params(ProductSellerQuery),
    responses((status = 200, description = "Ürün-satıcı kayıtları", body = [ProductSeller])),
    security(("api_jwt" = []))
)]
pub async fn list_product_sellers(
    State(app_state): State<AppState>,
    Query(query): Query<ProductSellerQuery>,
) -> Result<ApiResponse<Vec<ProductSeller>>, AppError> {
    Ok(ApiResponse::ok(app_state.user_service.list_product_sellers(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/product-sellers/{id}",
    tag = "Sellers",
    params(("id" = Uuid, Path, description = "Ürün-satıcı ID")),
    responses(
        (status = 200, description = "Ürün-satıcı kaydı", body = ProductSeller),
        (status = 404, description = "Kayıt bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product_seller(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ProductSeller>, AppError> {
    Ok(ApiResponse::ok(app_state.user_service.get_product_seller(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/product-sellers",
    tag = "Sellers",
    request_body = CreateProductSellerPayload,
    responses(
        (status = 201, description = "Satıcı ürüne bağlandı", body = ProductSeller),
        (status = 400, description = "Satıcı bir müşteri olmalı"),
        (status = 409, description = "Bu satıcı bu ürünü zaten satıyor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product_seller(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductSellerPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let link = app_state.user_service.create_product_seller(&payload).await?;
    Ok(ApiResponse::ok(link).created())
}

#[utoipa::path(
    put,
    path = "/api/admin/product-sellers/{id}",
    tag = "Sellers",
    params(("id" = Uuid, Path, description = "Ürün-satıcı ID")),
    request_body = UpdateProductSellerPayload,
    responses(
        (status = 200, description = "Satıcı fiyatı/stoğu güncellendi", body = ProductSeller),
        (status = 404, description = "Kayıt bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product_seller(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductSellerPayload>,
) -> Result<ApiResponse<ProductSeller>, AppError> {
    payload.validate()?;

    Ok(ApiResponse::ok(app_state.user_service.update_product_seller(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/product-sellers/{id}",
    tag = "Sellers",
    params(("id" = Uuid, Path, description = "Ürün-satıcı ID")),
    responses((status = 204, description = "Kayıt silindi")),
    security(("api_jwt" = []))
)]
pub async fn delete_product_seller(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.user_service.delete_product_seller(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
