//! Credential issuance core.
//!
//! Issuance is a pure, stateless function of (identity, configured secret,
//! configured issuer, validity window, current time). The issuer performs no
//! re-authentication: callers hand it identities they have already verified
//! to be sign-in eligible.

use crate::config::Config;
use crate::crypto::{self, Claims};
use crate::errors::AccountError;
use crate::models::Identity;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey};
use secrecy::ExposeSecret;

/// Signs and validates time-bound identity tokens with a symmetric secret.
///
/// Read-only after construction; safe to share across concurrent request
/// handlers without synchronization.
#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    ttl_seconds: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            issuer: issuer.into(),
            ttl_seconds,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.token_secret.expose_secret(),
            config.token_issuer.clone(),
            config.token_ttl_seconds,
        )
    }

    /// Issue a signed token asserting the given identity.
    ///
    /// Subject is the identity's username; display claims carry the first
    /// and last name plus a composite display name. Expiry is issuance time
    /// plus the configured validity window.
    pub fn issue(&self, identity: &Identity) -> Result<String, AccountError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Deterministic issuance against an explicit `now` timestamp.
    pub(crate) fn issue_at(&self, identity: &Identity, now: i64) -> Result<String, AccountError> {
        let claims = Claims {
            sub: identity.username.clone(),
            given_name: identity.first_name.clone(),
            family_name: identity.last_name.clone(),
            name: format!("{} {}", identity.first_name, identity.last_name),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_seconds,
        };

        crypto::sign_token(&claims, &self.encoding_key)
    }

    /// Validate a presented token: signature, issuer, and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, AccountError> {
        crypto::verify_token(token, &self.decoding_key, &self.issuer)
    }

    #[cfg(test)]
    pub(crate) fn validate_at(&self, token: &str, now: i64) -> Result<Claims, AccountError> {
        crypto::verify_token_at(token, &self.decoding_key, &self.issuer, now)
    }
}
