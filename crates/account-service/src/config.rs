use base64::{engine::general_purpose, Engine as _};
use secrecy::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default token validity window in seconds (15 minutes).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 900;

/// Minimum decoded signing secret length in bytes.
///
/// HMAC-SHA256 secrets shorter than the hash output weaken the signature;
/// anything under 32 bytes is treated as a fatal configuration error.
pub const MIN_TOKEN_SECRET_BYTES: usize = 32;

/// Bcrypt cost factor for password hashing.
pub const BCRYPT_COST: u32 = 12;

#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Symmetric signing secret, read-only after startup.
    pub token_secret: SecretBox<Vec<u8>>,
    pub token_issuer: String,
    pub token_ttl_seconds: i64,
}

// SecretBox is not Clone; re-wrap the exposed bytes explicitly.
impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            database_url: self.database_url.clone(),
            bind_address: self.bind_address.clone(),
            token_secret: SecretBox::new(Box::new(self.token_secret.expose_secret().clone())),
            token_issuer: self.token_issuer.clone(),
            token_ttl_seconds: self.token_ttl_seconds,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token secret: {0}")]
    InvalidTokenSecret(String),

    #[error("Invalid token issuer: {0}")]
    InvalidTokenIssuer(String),

    #[error("Invalid token TTL: {0}")]
    InvalidTokenTtl(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8083".to_string());

        let token_secret_base64 = vars
            .get("TOKEN_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("TOKEN_SECRET".to_string()))?;

        let token_secret = general_purpose::STANDARD
            .decode(token_secret_base64)
            .map_err(ConfigError::Base64Error)?;

        if token_secret.len() < MIN_TOKEN_SECRET_BYTES {
            return Err(ConfigError::InvalidTokenSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_TOKEN_SECRET_BYTES,
                token_secret.len()
            )));
        }

        let token_issuer = vars
            .get("TOKEN_ISSUER")
            .ok_or_else(|| ConfigError::MissingEnvVar("TOKEN_ISSUER".to_string()))?
            .clone();

        if token_issuer.trim().is_empty() {
            return Err(ConfigError::InvalidTokenIssuer(
                "Issuer must not be empty".to_string(),
            ));
        }

        let token_ttl_seconds = match vars.get("TOKEN_TTL_SECONDS") {
            Some(raw) => {
                let ttl: i64 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidTokenTtl(format!("Not a number: {}", raw)))?;
                if ttl <= 0 {
                    return Err(ConfigError::InvalidTokenTtl(format!(
                        "Must be positive, got {}",
                        ttl
                    )));
                }
                ttl
            }
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        Ok(Config {
            database_url,
            bind_address,
            token_secret: SecretBox::new(Box::new(token_secret)),
            token_issuer,
            token_ttl_seconds,
        })
    }
}
