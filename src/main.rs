// src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::{admin_guard, auth_guard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr;
    let app_state = AppState::new(config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("database migrations failed")?;

    tracing::info!("database migrations applied");

    // Storefront: open to guests
    let public_routes = Router::new()
        .route("/site", get(handlers::site::get_site_info))
        .route("/products", get(handlers::products::list_public_products))
        .route("/products/slug/{slug}", get(handlers::products::get_product_by_slug))
        .route("/categories", get(handlers::catalog::list_categories))
        .route("/categories/tree", get(handlers::catalog::category_tree))
        .route("/categories/slug/{slug}", get(handlers::catalog::get_category_by_slug))
        .route("/brands", get(handlers::catalog::list_brands))
        .route("/orders", post(handlers::orders::checkout));

    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let me_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/orders", get(handlers::auth::my_orders))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let admin_routes = Router::new()
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/products/{id}/variations",
            get(handlers::products::list_variations).post(handlers::products::create_variation),
        )
        .route(
            "/variations/{id}",
            get(handlers::products::get_variation)
                .put(handlers::products::update_variation)
                .delete(handlers::products::delete_variation),
        )
        .route(
            "/option-types",
            get(handlers::products::list_option_types).post(handlers::products::create_option_type),
        )
        .route(
            "/option-types/{id}/values",
            get(handlers::products::list_option_values).post(handlers::products::create_option_value),
        )
        .route("/categories", post(handlers::catalog::create_category))
        .route(
            "/categories/{id}",
            get(handlers::catalog::get_category)
                .put(handlers::catalog::update_category)
                .delete(handlers::catalog::delete_category),
        )
        .route("/brands", post(handlers::catalog::create_brand))
        .route(
            "/brands/{id}",
            get(handlers::catalog::get_brand)
                .put(handlers::catalog::update_brand)
                .delete(handlers::catalog::delete_brand),
        )
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route("/orders/{id}/status", put(handlers::orders::update_order_status))
        .route("/orders/{id}/shipping", put(handlers::orders::update_order_shipping))
        .route("/orders/{id}/payment", put(handlers::orders::upsert_order_payment))
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/sellers", get(handlers::users::list_sellers))
        .route(
            "/product-sellers",
            get(handlers::users::list_product_sellers).post(handlers::users::create_product_seller),
        )
        .route(
            "/product-sellers/{id}",
            get(handlers::users::get_product_seller)
                .put(handlers::users::update_product_seller)
                .delete(handlers::users::delete_product_seller),
        )
        .route("/import/{entity}", post(handlers::import::import_entities))
        .route("/import/{entity}/template", get(handlers::import::download_template))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            admin_guard,
        ));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", public_routes)
        .nest("/api/auth", auth_routes.merge(me_routes))
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("could not bind {}", bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
