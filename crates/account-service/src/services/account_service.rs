//! Registration, login, and token refresh flows.
//!
//! The flows delegate persistence and credential checks to the identity
//! store and token construction to the issuer; what lives here is the
//! policy: validation messages, normalization, and the uniform rejection
//! behavior on the login path.

use crate::crypto::{self, Claims};
use crate::errors::AccountError;
use crate::models::{NewIdentity, UserResponse};
use crate::repositories::IdentityStore;
use crate::services::token_service::TokenIssuer;

/// Minimum password length. No complexity requirements beyond this.
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Valid bcrypt hash of an unused password. Verified when no identity matches
// a login so that absent-user and wrong-password rejections take similar time.
const DUMMY_PASSWORD_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Register a new identity.
///
/// # Steps
///
/// 1. Validate password length, email format, and non-empty names (itemized)
/// 2. Reject if the email is already registered (case-insensitive)
/// 3. Lower-case-normalize names and email
/// 4. Create with the email marked confirmed (no confirmation flow exists)
///
/// Returns the confirmation text shown to the user.
pub async fn register(
    store: &dyn IdentityStore,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<String, AccountError> {
    let mut errors = Vec::new();

    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !is_valid_email(email) {
        errors.push("Invalid email format".to_string());
    }

    if first_name.trim().is_empty() {
        errors.push("First name cannot be empty".to_string());
    }

    if last_name.trim().is_empty() {
        errors.push("Last name cannot be empty".to_string());
    }

    if !errors.is_empty() {
        return Err(AccountError::Validation(errors));
    }

    let email = email.to_lowercase();

    // Checked before any identity is created. Unlike the login path, this
    // message names the address; see DESIGN.md.
    if store.email_exists(&email).await? {
        return Err(AccountError::Validation(vec![format!(
            "An existing account is using {}. Please try with another email address",
            email
        )]));
    }

    let fields = NewIdentity {
        first_name: first_name.trim().to_lowercase(),
        last_name: last_name.trim().to_lowercase(),
        email,
        email_confirmed: true,
    };

    let identity = store.create(fields, password).await.map_err(|e| {
        tracing::error!("Failed to create user: {}", e);
        e
    })?;

    tracing::info!(user_id = %identity.user_id, "User registered");

    Ok("Your account has been created, you can login now!".to_string())
}

/// Authenticate a username/password pair and issue a token.
///
/// Absent-user and wrong-password rejections are indistinguishable, in both
/// message and (approximate) timing. An unconfirmed email is rejected with
/// its own message and never reaches issuance.
pub async fn login(
    store: &dyn IdentityStore,
    issuer: &TokenIssuer,
    username: &str,
    password: &str,
) -> Result<UserResponse, AccountError> {
    let identity = store.find_by_username(&username.to_lowercase()).await?;

    // Always run a bcrypt verification, against a dummy hash if no identity
    // matched, so the two rejection paths take similar time.
    let password_ok = match &identity {
        Some(identity) => store.verify_password(identity, password).await?,
        None => {
            crypto::verify_password(password, DUMMY_PASSWORD_HASH)?;
            false
        }
    };

    let identity = identity.ok_or(AccountError::InvalidCredentials)?;

    if !identity.email_confirmed {
        return Err(AccountError::EmailNotConfirmed);
    }

    if !password_ok {
        return Err(AccountError::InvalidCredentials);
    }

    if let Err(e) = store.record_login(identity.user_id).await {
        tracing::warn!("Failed to record login: {}", e);
    }

    let token = issuer.issue(&identity)?;

    Ok(UserResponse::new(&identity, token))
}

/// Issue a fresh token for the identity named by an already-validated token.
pub async fn refresh(
    store: &dyn IdentityStore,
    issuer: &TokenIssuer,
    claims: &Claims,
) -> Result<UserResponse, AccountError> {
    let identity = store
        .find_by_username(&claims.sub)
        .await?
        .ok_or(AccountError::InvalidToken)?;

    let token = issuer.issue(&identity)?;

    Ok(UserResponse::new(&identity, token))
}

/// Simple email validation: something@something.something
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let (local, domain) = match (parts.first(), parts.get(1)) {
        (Some(l), Some(d)) => (*l, *d),
        _ => return false,
    };

    if local.is_empty() {
        return false;
    }

    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.len() < 2 {
        return false;
    }

    domain_parts.iter().all(|p| !p.is_empty())
}
