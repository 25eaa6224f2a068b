//! Deterministic configuration fixtures for testing.

use account_service::config::{Config, DEFAULT_TOKEN_TTL_SECONDS};
use secrecy::SecretBox;

/// Issuer string used by all test servers and fixtures.
pub const TEST_ISSUER: &str = "http://localhost:8083";

/// Deterministic 32-byte signing secret for reproducible tests.
pub fn test_token_secret() -> Vec<u8> {
    vec![
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d,
        0x1e, 0x1f,
    ]
}

/// A different valid secret, for negative tests.
pub fn other_token_secret() -> Vec<u8> {
    vec![0xff; 32]
}

/// Test configuration with the deterministic secret and issuer.
pub fn test_config() -> Config {
    test_config_with_ttl(DEFAULT_TOKEN_TTL_SECONDS)
}

/// Test configuration with an explicit token validity window.
pub fn test_config_with_ttl(ttl_seconds: i64) -> Config {
    Config {
        database_url: String::new(), // Not used once a pool/store is built
        bind_address: "127.0.0.1:0".to_string(),
        token_secret: SecretBox::new(Box::new(test_token_secret())),
        token_issuer: TEST_ISSUER.to_string(),
        token_ttl_seconds: ttl_seconds,
    }
}
