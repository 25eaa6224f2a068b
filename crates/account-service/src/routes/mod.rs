use crate::handlers::account_handler::{self, AppState};
use crate::middleware::auth;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Account endpoints
        .route("/api/account/login", post(account_handler::login))
        .route("/api/account/register", post(account_handler::register))
        .route(
            "/api/account/refresh-user-token",
            get(account_handler::refresh_user_token)
                .route_layer(from_fn_with_state(state.clone(), auth::require_bearer)),
        )
        // Health check
        .route("/health", get(health_check))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
