// src/models/brand.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    #[schema(example = "Anker")]
    pub name: String,
    #[schema(example = "anker")]
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrandPayload {
    #[validate(length(min = 1, message = "Marka adı zorunludur."))]
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "Logo geçerli bir adres olmalıdır."))]
    pub logo: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrandPayload {
    #[validate(length(min = 1, message = "Marka adı boş olamaz."))]
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "Logo geçerli bir adres olmalıdır."))]
    pub logo: Option<String>,
}
