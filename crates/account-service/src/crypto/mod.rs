use crate::config::BCRYPT_COST;
use crate::errors::AccountError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Maximum allowed token size in bytes (4KB).
///
/// Typical tokens issued here are 300-500 bytes. Oversized token strings are
/// rejected before any base64 decoding or signature verification so that a
/// hostile client cannot burn CPU and memory on parsing.
const MAX_TOKEN_SIZE_BYTES: usize = 4096;

/// Token claims structure.
///
/// The subject is the identity's username (lower-cased email); the name
/// claims carry display attributes for the client. All identity-bearing
/// fields are redacted in Debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username, the identity's stable identifier)
    pub sub: String,
    /// First name display claim
    pub given_name: String,
    /// Last name display claim
    pub family_name: String,
    /// Composite display name ("first last")
    pub name: String,
    /// Issuer string, static per deployment
    pub iss: String,
    /// Issued-at timestamp (Unix epoch seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("given_name", &"[REDACTED]")
            .field("family_name", &"[REDACTED]")
            .field("name", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Sign claims into a compact token with an HMAC-SHA256 secret.
#[instrument(skip_all)]
pub fn sign_token(claims: &Claims, encoding_key: &EncodingKey) -> Result<String, AccountError> {
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, encoding_key)
        .map_err(|e| AccountError::Crypto(format!("Token signing operation failed: {}", e)))
}

/// Verify a compact token against the configured secret and issuer.
///
/// Rejects when:
/// - the token exceeds `MAX_TOKEN_SIZE_BYTES` (checked before any parsing)
/// - the signature does not verify (any altered byte)
/// - the issuer claim does not match the configured issuer
/// - the expiry has elapsed
///
/// Audience is deliberately not validated: the issuing and consuming sides
/// are the same deployment.
#[instrument(skip_all)]
pub fn verify_token(
    token: &str,
    decoding_key: &DecodingKey,
    issuer: &str,
) -> Result<Claims, AccountError> {
    verify_token_at(token, decoding_key, issuer, chrono::Utc::now().timestamp())
}

/// Deterministic token verification against an explicit `now` timestamp.
///
/// Prefer [`verify_token`] in production code. This variant exists so the
/// expiry boundary can be unit-tested without wall-clock dependence. A token
/// is valid strictly before its `exp` instant and rejected at and after it,
/// with no leeway.
pub(crate) fn verify_token_at(
    token: &str,
    decoding_key: &DecodingKey,
    issuer: &str,
    now: i64,
) -> Result<Claims, AccountError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "crypto",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(AccountError::InvalidToken);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // Expiry is enforced below against the caller's clock with an exact
    // boundary; jsonwebtoken's built-in check carries a default leeway.
    validation.validate_exp = false;
    validation.validate_aud = false;

    let token_data = decode::<Claims>(token, decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        AccountError::InvalidToken
    })?;

    if now >= token_data.claims.exp {
        tracing::debug!(
            target: "crypto",
            exp = token_data.claims.exp,
            now = now,
            "Token rejected: expiry elapsed"
        );
        return Err(AccountError::InvalidToken);
    }

    Ok(token_data.claims)
}

/// Hash a password with bcrypt.
#[instrument(skip_all)]
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AccountError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AccountError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AccountError::Crypto(format!("Password verification failed: {}", e)))
}
