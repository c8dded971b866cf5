// src/handlers/site.rs

use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{common::response::ApiResponse, config::AppState};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub site_name: String,
    pub public_url: String,
}

#[utoipa::path(
    get,
    path = "/api/site",
    tag = "Storefront",
    responses((status = 200, description = "Mağaza adı ve adresi", body = SiteInfo))
)]
pub async fn get_site_info(State(app_state): State<AppState>) -> ApiResponse<SiteInfo> {
    ApiResponse::ok(SiteInfo {
        site_name: app_state.config.site_name.clone(),
        public_url: app_state.config.public_url.clone(),
    })
}
