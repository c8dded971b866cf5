// src/services/user_service.rs

use bcrypt::hash;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::{user_repo::UserFilter, ProductRepository, SellerRepository, UserRepository},
    models::auth::{
        CreateProductSellerPayload, CreateUserPayload, ProductSeller, ProductSellerQuery, SellerSummary,
        UpdateProductSellerPayload, UpdateUserPayload, User, UserQuery, UserRole,
    },
};

/// Hashes off the async runtime; bcrypt is deliberately slow.
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;
    Ok(hashed)
}

/// Only CUSTOMER accounts can act as sellers.
pub fn ensure_seller(user: &User) -> Result<(), AppError> {
    if user.role == UserRole::Customer {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Satıcı bir müşteri hesabı olmalıdır: {}",
            user.email
        )))
    }
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    user_repo: UserRepository,
    seller_repo: SellerRepository,
    product_repo: ProductRepository,
}

impl UserService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        seller_repo: SellerRepository,
        product_repo: ProductRepository,
    ) -> Self {
        Self { pool, user_repo, seller_repo, product_repo }
    }

    // --- USERS ---

    pub async fn list(&self, query: &UserQuery) -> Result<Paginated<User>, AppError> {
        let params = PageParams { page: query.page, limit: query.limit };
        let filter = UserFilter { role: query.role, search: query.search.clone() };

        let total = self.user_repo.count(&self.pool, &filter).await?;
        let users = self
            .user_repo
            .list(&self.pool, &filter, params.limit(), params.offset())
            .await?;

        Ok(Paginated::new(users, params, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Kullanıcı".into()))
    }

    pub async fn create(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        let email = payload.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&self.pool, &email).await?.is_some() {
            return Err(AppError::Conflict("Bu e-posta adresi zaten kullanılıyor.".into()));
        }

        let password_hash = hash_password(&payload.password).await?;
        let user = self
            .user_repo
            .create_user(
                &self.pool,
                payload.name.trim(),
                &email,
                &password_hash,
                payload.phone.as_deref(),
                payload.role,
            )
            .await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "user created");
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateUserPayload) -> Result<User, AppError> {
        let password_hash = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };
        let email = payload.email.as_deref().map(|e| e.trim().to_lowercase());

        self.user_repo
            .update_user(
                &self.pool,
                id,
                payload.name.as_deref().map(str::trim),
                email.as_deref(),
                password_hash.as_deref(),
                payload.phone.as_deref(),
                payload.role,
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.user_repo.delete_user(&self.pool, id).await? == 0 {
            return Err(AppError::NotFound("Kullanıcı".into()));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    // --- SELLERS ---

    pub async fn list_sellers(&self) -> Result<Vec<SellerSummary>, AppError> {
        self.seller_repo.list_sellers(&self.pool).await
    }

    pub async fn list_product_sellers(&self, query: &ProductSellerQuery) -> Result<Vec<ProductSeller>, AppError> {
        self.seller_repo.list(&self.pool, query.product_id, query.seller_id).await
    }

    pub async fn get_product_seller(&self, id: Uuid) -> Result<ProductSeller, AppError> {
        self.seller_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün satıcısı".into()))
    }

    pub async fn create_product_seller(&self, payload: &CreateProductSellerPayload) -> Result<ProductSeller, AppError> {
        self.product_repo
            .find_by_id(&self.pool, payload.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ürün".into()))?;
        let seller = self
            .user_repo
            .find_by_id(&self.pool, payload.seller_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Satıcı".into()))?;
        ensure_seller(&seller)?;

        let row = self
            .seller_repo
            .create(&self.pool, payload.product_id, payload.seller_id, payload.price, payload.stock)
            .await?;

        tracing::info!(product_seller_id = %row.id, product_id = %row.product_id, seller_id = %row.seller_id, "product seller linked");
        Ok(row)
    }

    pub async fn update_product_seller(
        &self,
        id: Uuid,
        payload: &UpdateProductSellerPayload,
    ) -> Result<ProductSeller, AppError> {
        self.seller_repo
            .update(&self.pool, id, payload.price, payload.stock)
            .await
    }

    pub async fn delete_product_seller(&self, id: Uuid) -> Result<(), AppError> {
        if self.seller_repo.delete(&self.pool, id).await? == 0 {
            return Err(AppError::NotFound("Ürün satıcısı".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Ayşe".into(),
            email: "ayse@example.com".into(),
            password_hash: String::new(),
            phone: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_customers_can_sell() {
        assert!(ensure_seller(&user(UserRole::Customer)).is_ok());
        assert!(ensure_seller(&user(UserRole::Admin)).is_err());
        assert!(ensure_seller(&user(UserRole::CustomerService)).is_err());
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("gizli-sifre").await.unwrap();
        assert_ne!(hashed, "gizli-sifre");
        assert!(bcrypt::verify("gizli-sifre", &hashed).unwrap());
    }
}
