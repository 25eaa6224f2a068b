use crate::errors::AccountError;
use crate::handlers::account_handler::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

/// Authentication middleware for protected routes.
///
/// Extracts the Bearer token from the Authorization header, validates its
/// signature, issuer, and expiry, and stores the claims in the request
/// extensions for downstream handlers.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AccountError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AccountError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AccountError::InvalidToken)?;

    let claims = state.issuer.validate(token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
