//! Repositorio de usuarios en PostgreSQL

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::Repository;
use crate::models::user::{normalize_email, NewUser, UserPatch};
use crate::models::{Entity, User};
use crate::utils::errors::{map_unique_violation, not_found_error, AppResult};

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Buscar por email sin distinguir mayúsculas
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl Repository<User> for UserRepository {
    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn add(&self, new: NewUser) -> AppResult<User> {
        let user = User::create(new, &[], Uuid::new_v4(), Utc::now())?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, full_name, role, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User", "email", &user.email))?;

        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let mut user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))?;

        user.apply(patch)?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET full_name = $2, role = $3, password_hash = $4 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }
}
