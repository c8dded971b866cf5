// src/db/user_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::{map_fk_violation, map_unique_violation, AppError},
    models::auth::{User, UserRole},
};

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

fn push_user_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &UserFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

// All interactions with the 'users' table
#[derive(Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &UserFilter, limit: i64, offset: i64) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_user_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id");
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let users = qb.build_query_as::<User>().fetch_all(executor).await?;
        Ok(users)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &UserFilter) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_user_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(executor).await?;
        Ok(total)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        password_hash: &str,
        phone: Option<&str>,
        role: UserRole,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, phone, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(phone)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || "Bu e-posta adresi zaten kullanılıyor.".to_string()))
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
        phone: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name          = COALESCE($2, name),
                email         = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                phone         = COALESCE($5, phone),
                role          = COALESCE($6, role),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(phone)
        .bind(role)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, || "Bu e-posta adresi zaten kullanılıyor.".to_string()))?
        .ok_or_else(|| AppError::NotFound("Kullanıcı".into()))
    }

    pub async fn delete_user<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_fk_violation(e, || "Satıcı kayıtları olan kullanıcı silinemez".into()))?;
        Ok(result.rows_affected())
    }
}
