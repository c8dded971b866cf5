// src/handlers/products.rs

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
    models::product::{
        CreateOptionTypePayload, CreateOptionValuePayload, CreateProductPayload, CreateVariationPayload,
        OptionType, ProductDetail, ProductFilter, ProductListItem, UpdateProductPayload,
        UpdateVariationPayload, VariationOption, VariationWithOptions,
    },
};

// --- STOREFRONT ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Storefront",
    params(ProductFilter),
    responses((status = 200, description = "Sayfalı ürün listesi", body = [ProductListItem]))
)]
pub async fn list_public_products(
    State(app_state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.product_service.list(&filter).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/products/slug/{slug}",
    tag = "Storefront",
    params(("slug" = String, Path, description = "Ürün slug değeri")),
    responses(
        (status = 200, description = "Ürün detayı", body = ProductDetail),
        (status = 404, description = "Ürün bulunamadı")
    )
)]
pub async fn get_product_by_slug(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<ProductDetail>, AppError> {
    let product = app_state.product_service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok(product))
}

// --- ADMIN: PRODUCTS ---

#[utoipa::path(
    get,
    path = "/api/admin/products",
    tag = "Products",
    params(ProductFilter),
    responses((status = 200, description = "Sayfalı ürün listesi", body = [ProductListItem])),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.product_service.list(&filter).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Ürün ID")),
    responses(
        (status = 200, description = "Ürün detayı", body = ProductDetail),
        (status = 404, description = "Ürün bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ProductDetail>, AppError> {
    let product = app_state.product_service.get_by_id(id).await?;
    Ok(ApiResponse::ok(product))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Ürün oluşturuldu", body = ProductDetail),
        (status = 400, description = "Geçersiz veri"),
        (status = 409, description = "Slug veya SKU çakışması")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let product = app_state.product_service.create(&payload).await?;
    Ok(ApiResponse::with_message(product, "Ürün oluşturuldu").created())
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Ürün ID")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Ürün güncellendi", body = ProductDetail),
        (status = 404, description = "Ürün bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<ApiResponse<ProductDetail>, AppError> {
    payload.validate()?;

    let product = app_state.product_service.update(id, &payload).await?;
    Ok(ApiResponse::with_message(product, "Ürün güncellendi"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Ürün ID")),
    responses(
        (status = 204, description = "Ürün ve bağlı kayıtları silindi"),
        (status = 403, description = "Yalnızca ADMIN"),
        (status = 404, description = "Ürün bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.product_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- ADMIN: VARIATIONS ---

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}/variations",
    tag = "Variations",
    params(("id" = Uuid, Path, description = "Ürün ID")),
    responses((status = 200, description = "Ürünün varyasyonları", body = [VariationWithOptions])),
    security(("api_jwt" = []))
)]
pub async fn list_variations(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<VariationWithOptions>>, AppError> {
    let variations = app_state.variation_service.list_for_product(product_id).await?;
    Ok(ApiResponse::ok(variations))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/variations",
    tag = "Variations",
    params(("id" = Uuid, Path, description = "Ürün ID")),
    request_body = CreateVariationPayload,
    responses(
        (status = 201, description = "Varyasyon oluşturuldu", body = VariationWithOptions),
        (status = 400, description = "SKU kullanımda veya seçenek tutarsız"),
        (status = 404, description = "Ürün bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_variation(
    State(app_state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CreateVariationPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let variation = app_state.variation_service.create(product_id, &payload).await?;
    Ok(ApiResponse::with_message(variation, "Varyasyon oluşturuldu").created())
}

#[utoipa::path(
    get,
    path = "/api/admin/variations/{id}",
    tag = "Variations",
    params(("id" = Uuid, Path, description = "Varyasyon ID")),
    responses(
        (status = 200, description = "Varyasyon", body = VariationWithOptions),
        (status = 404, description = "Varyasyon bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_variation(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<VariationWithOptions>, AppError> {
    Ok(ApiResponse::ok(app_state.variation_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/variations/{id}",
    tag = "Variations",
    params(("id" = Uuid, Path, description = "Varyasyon ID")),
    request_body = UpdateVariationPayload,
    responses(
        (status = 200, description = "Varyasyon güncellendi", body = VariationWithOptions),
        (status = 404, description = "Varyasyon bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_variation(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVariationPayload>,
) -> Result<ApiResponse<VariationWithOptions>, AppError> {
    payload.validate()?;

    let variation = app_state.variation_service.update(id, &payload).await?;
    Ok(ApiResponse::with_message(variation, "Varyasyon güncellendi"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/variations/{id}",
    tag = "Variations",
    params(("id" = Uuid, Path, description = "Varyasyon ID")),
    responses(
        (status = 204, description = "Varyasyon silindi"),
        (status = 404, description = "Varyasyon bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_variation(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.variation_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- ADMIN: OPTION TYPES ---

#[utoipa::path(
    get,
    path = "/api/admin/option-types",
    tag = "Variations",
    responses((status = 200, description = "Seçenek tipleri", body = [OptionType])),
    security(("api_jwt" = []))
)]
pub async fn list_option_types(State(app_state): State<AppState>) -> Result<ApiResponse<Vec<OptionType>>, AppError> {
    Ok(ApiResponse::ok(app_state.variation_service.list_option_types().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/option-types",
    tag = "Variations",
    request_body = CreateOptionTypePayload,
    responses(
        (status = 201, description = "Seçenek tipi oluşturuldu", body = OptionType),
        (status = 409, description = "Aynı isimde seçenek tipi var")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_option_type(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOptionTypePayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let option_type = app_state.variation_service.create_option_type(payload.name.trim()).await?;
    Ok(ApiResponse::ok(option_type).created())
}

#[utoipa::path(
    get,
    path = "/api/admin/option-types/{id}/values",
    tag = "Variations",
    params(("id" = Uuid, Path, description = "Seçenek tipi ID")),
    responses((status = 200, description = "Seçenek değerleri", body = [VariationOption])),
    security(("api_jwt" = []))
)]
pub async fn list_option_values(
    State(app_state): State<AppState>,
    Path(option_type_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<VariationOption>>, AppError> {
    let values = app_state.variation_service.list_option_values(option_type_id).await?;
    Ok(ApiResponse::ok(values))
}

#[utoipa::path(
    post,
    path = "/api/admin/option-types/{id}/values",
    tag = "Variations",
    params(("id" = Uuid, Path, description = "Seçenek tipi ID")),
    request_body = CreateOptionValuePayload,
    responses(
        (status = 201, description = "Seçenek değeri oluşturuldu", body = VariationOption),
        (status = 404, description = "Seçenek tipi bulunamadı")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_option_value(
    State(app_state): State<AppState>,
    Path(option_type_id): Path<Uuid>,
    Json(payload): Json<CreateOptionValuePayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let value = app_state
        .variation_service
        .create_option_value(option_type_id, payload.value.trim())
        .await?;
    Ok(ApiResponse::ok(value).created())
}
