//! Test server harness for end-to-end testing
//!
//! Spawns real account-service instances on an ephemeral port, backed either
//! by Postgres (for `#[sqlx::test]`) or by the in-memory store.

use crate::fixtures::test_config;
use crate::memory_store::MemoryIdentityStore;
use account_service::handlers::account_handler::AppState;
use account_service::repositories::postgres::PgIdentityStore;
use account_service::repositories::IdentityStore;
use account_service::routes;
use account_service::services::token_service::TokenIssuer;
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the account service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<(), anyhow::Error> {
///     let server = TestAccountServer::spawn_in_memory().await?;
///
///     let response = server.register("Alice", "Smith", "alice@example.com", "password123").await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestAccountServer {
    addr: SocketAddr,
    client: reqwest::Client,
    store: Arc<dyn IdentityStore>,
    issuer: TokenIssuer,
    _handle: JoinHandle<()>,
}

impl TestAccountServer {
    /// Spawn a test server backed by a Postgres pool
    /// (typically from `#[sqlx::test]`).
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        Self::with_store(Arc::new(PgIdentityStore::new(pool))).await
    }

    /// Spawn a test server backed by the in-memory store. No database needed.
    pub async fn spawn_in_memory() -> Result<Self, anyhow::Error> {
        Self::with_store(Arc::new(MemoryIdentityStore::new())).await
    }

    async fn with_store(store: Arc<dyn IdentityStore>) -> Result<Self, anyhow::Error> {
        let config = test_config();
        let issuer = TokenIssuer::from_config(&config);

        let state = Arc::new(AppState {
            store: store.clone(),
            issuer: issuer.clone(),
            config,
        });

        let app = routes::build_routes(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            client: reqwest::Client::new(),
            store,
            issuer,
            _handle: handle,
        })
    }

    /// Base URL of the running server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The identity store backing this server, for seeding test data.
    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    /// The token issuer this server validates against.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// POST /api/account/register
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/account/register", self.url()))
            .json(&json!({
                "firstName": first_name,
                "lastName": last_name,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        Ok(response)
    }

    /// POST /api/account/login
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/account/login", self.url()))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;
        Ok(response)
    }

    /// GET /api/account/refresh-user-token with a bearer token
    pub async fn refresh(&self, token: &str) -> Result<reqwest::Response, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/api/account/refresh-user-token", self.url()))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        Ok(response)
    }
}
