//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions over compact token strings.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_compact_jwt()
///     .assert_for_subject("alice@example.com")
///     .assert_issued_by("http://localhost:8083");
/// ```
pub trait TokenAssertions {
    /// Assert that the token has valid compact JWT structure (HS256 header)
    fn assert_compact_jwt(&self) -> &Self;

    /// Assert that the token's subject matches
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token's issuer claim matches
    fn assert_issued_by(&self, issuer: &str) -> &Self;

    /// Assert that the token's validity window is exactly the given seconds
    fn assert_validity_window(&self, seconds: i64) -> &Self;
}

fn decode_part<T: for<'de> Deserialize<'de>>(token: &str, index: usize, what: &str) -> T {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(
        parts.len(),
        3,
        "Token must have 3 parts (header.payload.signature), got {}",
        parts.len()
    );

    let bytes = URL_SAFE_NO_PAD
        .decode(parts[index])
        .unwrap_or_else(|e| panic!("Failed to base64 decode token {}: {:?}", what, e));

    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse token {} JSON: {:?}", what, e))
}

impl TokenAssertions for String {
    fn assert_compact_jwt(&self) -> &Self {
        let header: TokenHeader = decode_part(self, 0, "header");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        // Payload must parse as claims
        let _claims: TokenClaims = decode_part(self, 1, "payload");

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims: TokenClaims = decode_part(self, 1, "payload");
        assert_eq!(
            claims.sub, subject,
            "Token subject mismatch: expected {}, got {}",
            subject, claims.sub
        );
        self
    }

    fn assert_issued_by(&self, issuer: &str) -> &Self {
        let claims: TokenClaims = decode_part(self, 1, "payload");
        assert_eq!(
            claims.iss, issuer,
            "Token issuer mismatch: expected {}, got {}",
            issuer, claims.iss
        );
        self
    }

    fn assert_validity_window(&self, seconds: i64) -> &Self {
        let claims: TokenClaims = decode_part(self, 1, "payload");
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Token validity window mismatch"
        );
        self
    }
}
