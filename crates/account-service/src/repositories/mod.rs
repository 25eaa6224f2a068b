//! Identity store interface and adapters.
//!
//! The store owns password hashing and credential checking; callers never
//! see a password hash except through [`IdentityStore::verify_password`].

pub mod postgres;

use crate::errors::AccountError;
use crate::models::{Identity, NewIdentity};
use async_trait::async_trait;
use uuid::Uuid;

/// Capability interface over the identity/password subsystem.
///
/// One concrete adapter exists per storage backend: [`postgres::PgIdentityStore`]
/// for production, and an in-memory adapter in the test-utils crate.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an identity by its username (lower-cased email).
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AccountError>;

    /// Check whether an email address is already registered, case-insensitively.
    async fn email_exists(&self, email: &str) -> Result<bool, AccountError>;

    /// Create an identity, hashing the plaintext password before persisting.
    ///
    /// The username is derived from the (already normalized) email.
    async fn create(
        &self,
        fields: NewIdentity,
        password: &str,
    ) -> Result<Identity, AccountError>;

    /// Verify a plaintext password against an identity's stored hash.
    async fn verify_password(
        &self,
        identity: &Identity,
        password: &str,
    ) -> Result<bool, AccountError>;

    /// Record a successful login against the identity.
    async fn record_login(&self, user_id: Uuid) -> Result<(), AccountError>;
}
