use crate::config::Config;
use crate::crypto::Claims;
use crate::errors::AccountError;
use crate::models::UserResponse;
use crate::repositories::IdentityStore;
use crate::services::account_service;
use crate::services::token_service::TokenIssuer;
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IdentityStore>,
    pub issuer: TokenIssuer,
    pub config: Config,
}

/// Handle a login request
///
/// POST /api/account/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserResponse>, AccountError> {
    let response = account_service::login(
        state.store.as_ref(),
        &state.issuer,
        &payload.username,
        &payload.password,
    )
    .await?;

    Ok(Json(response))
}

/// Handle a registration request
///
/// POST /api/account/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<String, AccountError> {
    account_service::register(
        state.store.as_ref(),
        &payload.first_name,
        &payload.last_name,
        &payload.email,
        &payload.password,
    )
    .await
}

/// Issue a fresh token for the authenticated bearer
///
/// GET /api/account/refresh-user-token
///
/// The bearer middleware has already validated the presented token and
/// stored its claims in the request extensions.
pub async fn refresh_user_token(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserResponse>, AccountError> {
    let response =
        account_service::refresh(state.store.as_ref(), &state.issuer, &claims).await?;

    Ok(Json(response))
}
