// src/config.rs

use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        BrandRepository, CategoryRepository, OrderRepository, ProductRepository, SellerRepository, UserRepository,
        VariationRepository,
    },
    services::{
        auth::AuthService,
        brand_service::BrandService,
        category_service::CategoryService,
        import_service::{CatalogImportStore, ImportService},
        order_service::OrderService,
        product_service::ProductService,
        user_service::UserService,
        variation_service::VariationService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub site_name: String,
    pub public_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;
        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().context("DB_MAX_CONNECTIONS must be a positive integer")?,
            None => 5,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            site_name: lookup("SITE_NAME").unwrap_or_else(|| "Mağaza".to_string()),
            public_url: lookup("PUBLIC_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub product_service: ProductService,
    pub variation_service: VariationService,
    pub category_service: CategoryService,
    pub brand_service: BrandService,
    pub order_service: OrderService,
    pub user_service: UserService,
    pub import_service: ImportService<CatalogImportStore>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("could not connect to the database")?;

        tracing::info!("database connection established");

        Ok(Self::with_pool(db_pool, config))
    }

    /// Wires every repository and service around an existing pool.
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new();
        let category_repo = CategoryRepository::new();
        let brand_repo = BrandRepository::new();
        let product_repo = ProductRepository::new();
        let variation_repo = VariationRepository::new();
        let order_repo = OrderRepository::new();
        let seller_repo = SellerRepository::new();

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let variation_service = VariationService::new(db_pool.clone(), variation_repo.clone(), product_repo.clone());
        let category_service = CategoryService::new(db_pool.clone(), category_repo.clone(), product_repo.clone());
        let brand_service = BrandService::new(db_pool.clone(), brand_repo.clone(), product_repo.clone());
        let product_service = ProductService::new(
            db_pool.clone(),
            product_repo.clone(),
            variation_repo.clone(),
            category_repo.clone(),
            brand_repo.clone(),
            variation_service.clone(),
        );
        let order_service = OrderService::new(
            db_pool.clone(),
            order_repo,
            product_repo.clone(),
            variation_repo.clone(),
        );
        let user_service = UserService::new(db_pool.clone(), user_repo, seller_repo, product_repo.clone());

        let import_service = ImportService::new(CatalogImportStore::new(
            db_pool.clone(),
            category_repo,
            brand_repo,
            product_repo,
            variation_repo,
            category_service.clone(),
            brand_service.clone(),
            product_service.clone(),
            variation_service.clone(),
        ));

        Self {
            db_pool,
            config,
            auth_service,
            product_service,
            variation_service,
            category_service,
            brand_service,
            order_service,
            user_service,
            import_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop"), ("JWT_SECRET", "s3cret")]))
                .unwrap();

        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.site_name, "Mağaza");
        assert_eq!(config.public_url, "http://localhost:3000");
    }

    #[test]
    fn missing_required_var_names_it() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let vars = [("DATABASE_URL", "x"), ("JWT_SECRET", "y"), ("DB_MAX_CONNECTIONS", "many")];
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
