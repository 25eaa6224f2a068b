//! E2E tests for registration, login, and token refresh flows.
//!
//! All tests run against a real server instance backed by the in-memory
//! identity store; the Postgres adapter has its own `#[sqlx::test]` coverage
//! in the repositories module.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use account_service::config::DEFAULT_TOKEN_TTL_SECONDS;
use account_service::models::NewIdentity;
use account_service::repositories::IdentityStore;
use account_test_utils::assertions::TokenAssertions;
use account_test_utils::fixtures::TEST_ISSUER;
use account_test_utils::server_harness::TestAccountServer;
use reqwest::StatusCode;

// ============================================================================
// Registration Tests
// ============================================================================

/// Happy path: a new user can register and is told to log in.
#[tokio::test]
async fn test_register_happy_path() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;

    let response = server
        .register("Alice", "Smith", "alice@example.com", "password123")
        .await?;

    assert_eq!(response.status(), StatusCode::OK, "Registration should succeed");
    let body = response.text().await?;
    assert!(
        body.contains("you can login now"),
        "Response should be the confirmation text, got: {}",
        body
    );

    Ok(())
}

/// Registration normalizes names and email to lower case; the subsequent
/// login returns the normalized display attributes.
#[tokio::test]
async fn test_register_normalizes_fields() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;

    let response = server
        .register("Alice", "SMITH", "Alice@Example.COM", "password123")
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let login = server.login("alice@example.com", "password123").await?;
    assert_eq!(login.status(), StatusCode::OK);

    let body: serde_json::Value = login.json().await?;
    assert_eq!(body["firstName"].as_str(), Some("alice"));
    assert_eq!(body["lastName"].as_str(), Some("smith"));

    Ok(())
}

/// Registering the same email with different casing is rejected with an
/// itemized message, before any identity is created.
#[tokio::test]
async fn test_register_duplicate_email_case_insensitive() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;

    let first = server
        .register("First", "User", "User@X.com", "password123")
        .await?;
    assert_eq!(first.status(), StatusCode::OK);

    let second = server
        .register("Second", "User", "user@x.com", "password456")
        .await?;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = second.json().await?;
    let errors = body["errors"].as_array().expect("errors should be an array");
    assert!(
        errors
            .iter()
            .any(|e| e.as_str().unwrap_or("").contains("existing account")),
        "Duplicate email should be itemized, got: {:?}",
        errors
    );

    Ok(())
}

/// Password policy: minimum length 6, no complexity requirements.
#[tokio::test]
async fn test_register_password_policy() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;

    let short = server
        .register("Bob", "Jones", "bob@example.com", "12345")
        .await?;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = short.json().await?;
    let errors = body["errors"].as_array().expect("errors should be an array");
    assert!(
        errors
            .iter()
            .any(|e| e.as_str().unwrap_or("").contains("6 characters")),
        "Password policy violation should be itemized, got: {:?}",
        errors
    );

    // Exactly 6 characters, no digits/case/symbol requirements
    let minimal = server
        .register("Bob", "Jones", "bob@example.com", "aaaaaa")
        .await?;
    assert_eq!(minimal.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Login Tests
// ============================================================================

/// Happy path: login returns display attributes and a well-formed token
/// carrying the expected subject, issuer, and validity window.
#[tokio::test]
async fn test_login_happy_path() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;
    server
        .register("Alice", "Smith", "alice@example.com", "password123")
        .await?;

    let response = server.login("alice@example.com", "password123").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["firstName"].as_str(), Some("alice"));
    assert_eq!(body["lastName"].as_str(), Some("smith"));

    let token = body["token"]
        .as_str()
        .expect("Response should include a token")
        .to_string();
    token
        .assert_compact_jwt()
        .assert_for_subject("alice@example.com")
        .assert_issued_by(TEST_ISSUER)
        .assert_validity_window(DEFAULT_TOKEN_TTL_SECONDS);

    Ok(())
}

/// Absent username and wrong password must be indistinguishable: same
/// status, same plain-text body.
#[tokio::test]
async fn test_login_rejections_indistinguishable() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;
    server
        .register("Alice", "Smith", "alice@example.com", "password123")
        .await?;

    let absent = server.login("nobody@example.com", "password123").await?;
    let wrong = server.login("alice@example.com", "wrong-password").await?;

    assert_eq!(absent.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let absent_body = absent.text().await?;
    let wrong_body = wrong.text().await?;
    assert_eq!(absent_body, wrong_body);
    assert_eq!(absent_body, "Invalid username or password");

    Ok(())
}

/// A correct password with an unconfirmed email gets the confirmation
/// message and no token.
#[tokio::test]
async fn test_login_unconfirmed_email_rejected() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;

    // Seed directly through the store; the register endpoint always confirms
    server
        .store()
        .create(
            NewIdentity {
                first_name: "carol".to_string(),
                last_name: "jones".to_string(),
                email: "carol@example.com".to_string(),
                email_confirmed: false,
            },
            "password123",
        )
        .await
        .expect("Seeding identity should succeed");

    let response = server.login("carol@example.com", "password123").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.text().await?, "Please confirm your email.");

    Ok(())
}

// ============================================================================
// Refresh Tests
// ============================================================================

/// A valid bearer gets a fresh token for the same identity.
#[tokio::test]
async fn test_refresh_returns_fresh_token() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;
    server
        .register("Alice", "Smith", "alice@example.com", "password123")
        .await?;

    let login: serde_json::Value = server
        .login("alice@example.com", "password123")
        .await?
        .json()
        .await?;
    let token = login["token"].as_str().expect("Login should return a token");

    let response = server.refresh(token).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["firstName"].as_str(), Some("alice"));

    let refreshed = body["token"]
        .as_str()
        .expect("Refresh should return a token")
        .to_string();
    refreshed
        .assert_compact_jwt()
        .assert_for_subject("alice@example.com")
        .assert_issued_by(TEST_ISSUER);

    // The fresh token must itself validate
    server
        .issuer()
        .validate(&refreshed)
        .expect("Refreshed token should validate");

    Ok(())
}

/// Refresh without a bearer token is rejected.
#[tokio::test]
async fn test_refresh_without_token_rejected() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;

    let response = server
        .client()
        .get(format!("{}/api/account/refresh-user-token", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
