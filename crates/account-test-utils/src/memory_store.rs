//! In-memory identity store adapter.
//!
//! Backs the same [`IdentityStore`] interface as the Postgres adapter so
//! registration/login/refresh logic can be exercised without a database.
//! Passwords are hashed with the same bcrypt routine as production.

use account_service::crypto;
use account_service::errors::AccountError;
use account_service::models::{Identity, NewIdentity};
use account_service::repositories::IdentityStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryIdentityStore {
    users: Mutex<Vec<Identity>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored identities.
    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove an identity by username. No-op if absent.
    pub fn remove(&self, username: &str) {
        if let Ok(mut users) = self.users.lock() {
            users.retain(|u| u.username != username);
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Identity>>, AccountError> {
        self.users.lock().map_err(|_| AccountError::Internal)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AccountError> {
        let users = self.lock()?;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AccountError> {
        let users = self.lock()?;
        let needle = email.to_lowercase();
        Ok(users.iter().any(|u| u.email.to_lowercase() == needle))
    }

    async fn create(
        &self,
        fields: NewIdentity,
        password: &str,
    ) -> Result<Identity, AccountError> {
        let password_hash = crypto::hash_password(password)?;

        let mut users = self.lock()?;

        let needle = fields.email.to_lowercase();
        if users.iter().any(|u| u.email.to_lowercase() == needle) {
            return Err(AccountError::Database(
                "User with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let identity = Identity {
            user_id: Uuid::new_v4(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            username: fields.email.clone(),
            email: fields.email,
            email_confirmed: fields.email_confirmed,
            password_hash,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        users.push(identity.clone());

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
        let mut users = self.lock()?;
        if let Some(user) = users.iter_mut().find(|u| u.user_id == user_id) {
            let now = Utc::now();
            user.last_login_at = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }
}
