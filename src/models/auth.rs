// src/models/auth.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_negative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Customer,
    CustomerService,
}

impl UserRole {
    /// Roles allowed into the admin namespace.
    pub fn is_staff(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::CustomerService)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A seller's offer for a product. Sellers are CUSTOMER users owning rows here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSeller {
    pub id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub product_count: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "Ad zorunludur."))]
    pub name: String,
    #[validate(email(message = "Geçersiz e-posta adresi."))]
    pub email: String,
    #[validate(length(min = 6, message = "Şifre en az 6 karakter olmalıdır."))]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "Geçersiz e-posta adresi."))]
    pub email: String,
    #[validate(length(min = 1, message = "Şifre zorunludur."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

// ---
// Admin user management
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "Ad zorunludur."))]
    pub name: String,
    #[validate(email(message = "Geçersiz e-posta adresi."))]
    pub email: String,
    #[validate(length(min = 6, message = "Şifre en az 6 karakter olmalıdır."))]
    pub password: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "Ad boş olamaz."))]
    pub name: Option<String>,
    #[validate(email(message = "Geçersiz e-posta adresi."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Şifre en az 6 karakter olmalıdır."))]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    #[param(inline)]
    pub role: Option<UserRole>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductSellerPayload {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stok negatif olamaz."))]
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductSellerPayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stok negatif olamaz."))]
    pub stock: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductSellerQuery {
    pub product_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
}
