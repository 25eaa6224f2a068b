use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Fixed rejection text for bad credentials.
///
/// Absent-user and wrong-password failures must be indistinguishable to the
/// caller, so both map to this exact message.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Fixed rejection text for an unconfirmed email address.
pub const EMAIL_NOT_CONFIRMED_MESSAGE: &str = "Please confirm your email.";

/// Fixed rejection text for a token that fails validation for any reason.
pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("{}", EMAIL_NOT_CONFIRMED_MESSAGE)]
    EmailNotConfirmed,

    #[error("{}", INVALID_TOKEN_MESSAGE)]
    InvalidToken,

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ValidationResponse {
    errors: Vec<String>,
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        match self {
            // Authentication failures carry a fixed plain-text reason and
            // nothing else.
            AccountError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS_MESSAGE).into_response()
            }
            AccountError::EmailNotConfirmed => {
                (StatusCode::UNAUTHORIZED, EMAIL_NOT_CONFIRMED_MESSAGE).into_response()
            }
            AccountError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, INVALID_TOKEN_MESSAGE).into_response()
            }

            // Registration validation failures are itemized and user-visible.
            AccountError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationResponse { errors }),
            )
                .into_response(),

            // Internal failure detail stays in the logs.
            AccountError::Database(_) | AccountError::Crypto(_) | AccountError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
            )
                .into_response(),
        }
    }
}
