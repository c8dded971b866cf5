// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// A set of roles allowed through a `RequireRole` gate.
pub trait RoleDef: Send + Sync + 'static {
    fn roles() -> &'static [UserRole];
}

/// Extractor that fails with 403 unless the authenticated user holds one of
/// `T::roles()`. Must run behind `auth_guard` or `admin_guard`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::roles().contains(&user.role) {
            tracing::warn!(user_id = %user.id, role = ?user.role, path = %parts.uri.path(), "role check failed");
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// Roles
// ---

pub struct RoleAdmin;
impl RoleDef for RoleAdmin {
    fn roles() -> &'static [UserRole] {
        &[UserRole::Admin]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;
    use uuid::Uuid;

    fn parts_with(role: Option<UserRole>) -> Parts {
        let (mut parts, _) = Request::builder().uri("/api/admin/users").body(()).unwrap().into_parts();
        if let Some(role) = role {
            let now = Utc::now();
            parts.extensions.insert(User {
                id: Uuid::new_v4(),
                name: "Zeynep".into(),
                email: "zeynep@example.com".into(),
                password_hash: String::new(),
                phone: None,
                role,
                created_at: now,
                updated_at: now,
            });
        }
        parts
    }

    #[tokio::test]
    async fn admin_passes() {
        let mut parts = parts_with(Some(UserRole::Admin));
        assert!(RequireRole::<RoleAdmin>::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn customer_service_is_forbidden() {
        let mut parts = parts_with(Some(UserRole::CustomerService));
        let result = RequireRole::<RoleAdmin>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn missing_user_is_unauthenticated() {
        let mut parts = parts_with(None);
        let result = RequireRole::<RoleAdmin>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
