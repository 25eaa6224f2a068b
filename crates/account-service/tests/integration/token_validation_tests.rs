//! Token validation edge cases exercised end-to-end against the refresh
//! endpoint, which is the one protected route.

use account_service::crypto::{self, Claims};
use account_test_utils::fixtures::{other_token_secret, test_token_secret, TEST_ISSUER};
use account_test_utils::server_harness::TestAccountServer;
use jsonwebtoken::EncodingKey;
use reqwest::StatusCode;

async fn spawn_with_alice() -> Result<TestAccountServer, anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;
    let response = server
        .register("Alice", "Smith", "alice@example.com", "password123")
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(server)
}

fn alice_claims(iat: i64, exp: i64, issuer: &str) -> Claims {
    Claims {
        sub: "alice@example.com".to_string(),
        given_name: "alice".to_string(),
        family_name: "smith".to_string(),
        name: "alice smith".to_string(),
        iss: issuer.to_string(),
        iat,
        exp,
    }
}

#[tokio::test]
async fn test_garbage_token_rejected() -> Result<(), anyhow::Error> {
    let server = spawn_with_alice().await?;

    for garbage in ["not-a-token", "a.b.c", ""] {
        let response = server.refresh(garbage).await?;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Garbage token {:?} should be rejected",
            garbage
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_tampered_token_rejected() -> Result<(), anyhow::Error> {
    let server = spawn_with_alice().await?;

    let login: serde_json::Value = server
        .login("alice@example.com", "password123")
        .await?
        .json()
        .await?;
    let token = login["token"]
        .as_str()
        .expect("Login should return a token")
        .to_string();

    // Sanity: the untampered token works
    assert_eq!(server.refresh(&token).await?.status(), StatusCode::OK);

    // Append a character to the payload part
    let parts: Vec<&str> = token.split('.').collect();
    let tampered = format!("{}.{}X.{}", parts[0], parts[1], parts[2]);

    let response = server.refresh(&tampered).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_expired_token_rejected() -> Result<(), anyhow::Error> {
    let server = spawn_with_alice().await?;

    let now = chrono::Utc::now().timestamp();
    let claims = alice_claims(now - 7200, now - 3600, TEST_ISSUER);
    let token = crypto::sign_token(&claims, &EncodingKey::from_secret(&test_token_secret()))
        .expect("Signing should succeed");

    let response = server.refresh(&token).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.text().await?,
        "The access token is invalid or expired"
    );

    Ok(())
}

#[tokio::test]
async fn test_token_with_wrong_issuer_rejected() -> Result<(), anyhow::Error> {
    let server = spawn_with_alice().await?;

    let now = chrono::Utc::now().timestamp();
    let claims = alice_claims(now, now + 900, "http://other-deployment");
    let token = crypto::sign_token(&claims, &EncodingKey::from_secret(&test_token_secret()))
        .expect("Signing should succeed");

    let response = server.refresh(&token).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() -> Result<(), anyhow::Error> {
    let server = spawn_with_alice().await?;

    let now = chrono::Utc::now().timestamp();
    let claims = alice_claims(now, now + 900, TEST_ISSUER);
    let token = crypto::sign_token(&claims, &EncodingKey::from_secret(&other_token_secret()))
        .expect("Signing should succeed");

    let response = server.refresh(&token).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_non_bearer_authorization_rejected() -> Result<(), anyhow::Error> {
    let server = spawn_with_alice().await?;

    let response = server
        .client()
        .get(format!("{}/api/account/refresh-user-token", server.url()))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// A token for an identity that has since been removed is rejected at
/// refresh even though its signature and expiry are valid.
#[tokio::test]
async fn test_valid_token_for_missing_identity_rejected() -> Result<(), anyhow::Error> {
    let server = TestAccountServer::spawn_in_memory().await?;

    let now = chrono::Utc::now().timestamp();
    let claims = alice_claims(now, now + 900, TEST_ISSUER);
    let token = crypto::sign_token(&claims, &EncodingKey::from_secret(&test_token_secret()))
        .expect("Signing should succeed");

    let response = server.refresh(&token).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
