// src/services/auth.rs

use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, RegisterUserPayload, User, UserRole},
    services::user_service::hash_password,
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    /// Storefront sign-up. Always creates a CUSTOMER.
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        let email = payload.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&self.pool, &email).await?.is_some() {
            return Err(AppError::Conflict("Bu e-posta adresi zaten kullanılıyor.".into()));
        }

        let hashed_password = hash_password(&payload.password).await?;

        let new_user = self
            .user_repo
            .create_user(
                &self.pool,
                payload.name.trim(),
                &email,
                &hashed_password,
                payload.phone.as_deref(),
                UserRole::Customer,
            )
            .await?;

        tracing::info!(user_id = %new_user.id, "customer registered");
        self.create_token(&new_user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, &email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    /// Decodes the bearer token and loads the user it names. The role is
    /// read from the database, not trusted from the claims.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_claims(token)?;

        self.user_repo
            .find_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn service() -> AuthService {
        // Lazy pool: never connects in these tests.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        AuthService::new(UserRepository::new(), "test-secret".into(), pool)
    }

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Mehmet".into(),
            email: "mehmet@example.com".into(),
            password_hash: String::new(),
            phone: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn token_round_trips_subject_and_role() {
        let service = service();
        let user = user(UserRole::CustomerService);

        let token = service.create_token(&user).unwrap();
        let claims = service.decode_claims(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::CustomerService);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let other = AuthService { jwt_secret: "other".into(), ..service() };
        let token = other.create_token(&user(UserRole::Admin)).unwrap();

        assert!(matches!(service().decode_claims(&token), Err(AppError::InvalidToken)));
        assert!(matches!(service().decode_claims("not-a-jwt"), Err(AppError::InvalidToken)));
    }
}
