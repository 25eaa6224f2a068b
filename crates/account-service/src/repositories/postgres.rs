//! Postgres adapter for the identity store.

use crate::crypto;
use crate::errors::AccountError;
use crate::models::{Identity, NewIdentity};
use crate::repositories::IdentityStore;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const IDENTITY_COLUMNS: &str = r#"
    user_id, first_name, last_name, username, email, email_confirmed,
    password_hash, created_at, updated_at, last_login_at
"#;

/// sqlx-backed identity store (users table, schema in migrations/).
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AccountError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            r#"
            SELECT {IDENTITY_COLUMNS}
            FROM users
            WHERE username = $1
            "#
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::Database(format!("Failed to fetch user by username: {}", e)))?;

        Ok(identity)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AccountError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE LOWER(email) = LOWER($1)
            )
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AccountError::Database(format!("Failed to check email existence: {}", e)))?;

        Ok(exists.0)
    }

    async fn create(
        &self,
        fields: NewIdentity,
        password: &str,
    ) -> Result<Identity, AccountError> {
        let password_hash = crypto::hash_password(password)?;

        let identity = sqlx::query_as::<_, Identity>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, username, email, email_confirmed, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.email)
        .bind(fields.email_confirmed)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Unique constraint violation: the existence pre-check lost a race
            if e.to_string().contains("users_username_unique")
                || e.to_string().contains("users_email_lower_unique")
            {
                AccountError::Database("User with this email already exists".to_string())
            } else {
                AccountError::Database(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(identity)
    }

    async fn verify_password(
        &self,
        identity: &Identity,
        password: &str,
    ) -> Result<bool, AccountError> {
        crypto::verify_password(password, &identity.password_hash)
    }

    async fn record_login(&self, user_id: Uuid) -> Result<(), AccountError> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::Database(format!("Failed to record login: {}", e)))?;

        Ok(())
    }
}
