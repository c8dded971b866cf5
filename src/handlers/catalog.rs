// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin},
    models::{
        brand::{Brand, CreateBrandPayload, UpdateBrandPayload},
        category::{Category, CategoryNode, CreateCategoryPayload, UpdateCategoryPayload},
    },
};

// --- CATEGORIES ---

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses((status = 200, description = "Tüm kategoriler (düz liste)", body = [Category]))
)]
pub async fn list_categories(State(app_state): State<AppState>) -> Result<ApiResponse<Vec<Category>>, AppError> {
    Ok(ApiResponse::ok(app_state.category_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/tree",
    tag = "Categories",
    responses((status = 200, description = "Kategori ağacı", body = [CategoryNode]))
)]
pub async fn category_tree(State(app_state): State<AppState>) -> Result<ApiResponse<Vec<CategoryNode>>, AppError> {
    Ok(ApiResponse::ok(app_state.category_service.tree().await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/slug/{slug}",
    tag = "Categories",
    params(("slug" = String, Path, description = "Kategori slug değeri")),
    responses(
        (status = 200, description = "Kategori", body = Category),
        (status = 404, description = "Kategori bulunamadı")
    )
)]
pub async fn get_category_by_slug(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<Category>, AppError> {
    Ok(ApiResponse::ok(app_state.category_service.get_by_slug(&slug).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Kategori ID")),
    responses(
        (status = 200, description = "Kategori", body = Category),
        (status = 404, description = "Kategori bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Category>, AppError> {
    Ok(ApiResponse::ok(app_state.category_service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    tag = "Categories",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Kategori oluşturuldu", body = Category),
        (status = 404, description = "Üst kategori bulunamadı"),
        (status = 409, description = "Slug kullanımda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let category = app_state.category_service.create(&payload).await?;
    Ok(ApiResponse::with_message(category, "Kategori oluşturuldu").created())
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Kategori ID")),
    request_body = UpdateCategoryPayload,
    responses(
        (status = 200, description = "Kategori güncellendi", body = Category),
        (status = 400, description = "Kategori kendi alt kategorisine taşınamaz"),
        (status = 404, description = "Kategori bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<ApiResponse<Category>, AppError> {
    payload.validate()?;

    let category = app_state.category_service.update(id, &payload).await?;
    Ok(ApiResponse::with_message(category, "Kategori güncellendi"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Kategori ID")),
    responses(
        (status = 204, description = "Kategori silindi"),
        (status = 409, description = "Alt kategorisi veya ürünü olan kategori silinemez")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- BRANDS ---

#[utoipa::path(
    get,
    path = "/api/brands",
    tag = "Brands",
    responses((status = 200, description = "Tüm markalar", body = [Brand]))
)]
pub async fn list_brands(State(app_state): State<AppState>) -> Result<ApiResponse<Vec<Brand>>, AppError> {
    Ok(ApiResponse::ok(app_state.brand_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/brands/{id}",
    tag = "Brands",
    params(("id" = Uuid, Path, description = "Marka ID")),
    responses(
        (status = 200, description = "Marka", body = Brand),
        (status = 404, description = "Marka bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_brand(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<Brand>, AppError> {
    Ok(ApiResponse::ok(app_state.brand_service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/brands",
    tag = "Brands",
    request_body = CreateBrandPayload,
    responses(
        (status = 201, description = "Marka oluşturuldu", body = Brand),
        (status = 409, description = "İsim veya slug kullanımda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_brand(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateBrandPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let brand = app_state.brand_service.create(&payload).await?;
    Ok(ApiResponse::with_message(brand, "Marka oluşturuldu").created())
}

#[utoipa::path(
    put,
    path = "/api/admin/brands/{id}",
    tag = "Brands",
    params(("id" = Uuid, Path, description = "Marka ID")),
    request_body = UpdateBrandPayload,
    responses(
        (status = 200, description = "Marka güncellendi", body = Brand),
        (status = 404, description = "Marka bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_brand(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBrandPayload>,
) -> Result<ApiResponse<Brand>, AppError> {
    payload.validate()?;

    let brand = app_state.brand_service.update(id, &payload).await?;
    Ok(ApiResponse::with_message(brand, "Marka güncellendi"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/brands/{id}",
    tag = "Brands",
    params(("id" = Uuid, Path, description = "Marka ID")),
    responses(
        (status = 204, description = "Marka silindi"),
        (status = 409, description = "Ürünü olan marka silinemez")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_brand(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.brand_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
