//! E2E tests for the request gate.
//!
//! ## Test Categories
//!
//! - **Authentication**: missing, malformed, forged and expired tokens
//! - **Authorization**: role sets per route
//! - **Revocation**: disabled or re-roled users with tokens already issued
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use bo_service::clock::Clock;
use bo_service::models::Role;
use bo_test_utils::{
    TestBackOfficeServer, TestClaimsBuilder, ADMIN_EMAIL, MEMBER_EMAIL, OWNER_EMAIL,
    TEST_JWT_SECRET, WRONG_JWT_SECRET,
};
use chrono::Duration;
use reqwest::StatusCode;

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        response.headers().contains_key("www-authenticate"),
        "401 responses should carry WWW-Authenticate"
    );

    Ok(())
}

#[tokio::test]
async fn test_protected_route_with_non_bearer_header_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let response = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .header("Authorization", format!("Token {}", owner.token))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let forged = TestClaimsBuilder::new(server.clock().now())
        .for_identity(&owner.identity)
        .sign(WRONG_JWT_SECRET);

    let response = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(forged)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_forged_expired_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let expired = TestClaimsBuilder::new(server.clock().now())
        .for_identity(&owner.identity)
        .expires_in(-1)
        .sign(TEST_JWT_SECRET);

    let response = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(expired)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_issued_in_future_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let an_hour_ahead = (server.clock().now() + Duration::hours(1)).timestamp();
    let token = TestClaimsBuilder::new(server.clock().now())
        .for_identity(&owner.identity)
        .issued_at(an_hour_ahead)
        .sign(TEST_JWT_SECRET);

    let response = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_expires_after_session_lifetime() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    server.clock().advance(Duration::hours(23));
    let still_valid = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(still_valid.status(), StatusCode::OK);

    server.clock().advance(Duration::hours(1));
    let expired = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_with_shared_secret_is_accepted() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let token = TestClaimsBuilder::new(server.clock().now())
        .for_identity(&owner.identity)
        .sign(TEST_JWT_SECRET);

    let response = server
        .client()
        .get(format!("{}/api/team", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_member_on_manage_route_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    for (method, path) in [
        (reqwest::Method::GET, "/api/user"),
        (reqwest::Method::GET, "/api/team"),
        (reqwest::Method::POST, "/api/product"),
        (reqwest::Method::POST, "/api/meeting"),
    ] {
        let response = server
            .client()
            .request(method.clone(), format!("{}{}", server.url(), path))
            .bearer_auth(&member.token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "{} {} should be forbidden for MEMBER",
            method,
            path
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_member_on_read_route_is_allowed() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    for path in ["/api/product", "/api/meeting"] {
        let response = server
            .client()
            .get(format!("{}{}", server.url(), path))
            .bearer_auth(&member.token)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::OK, "GET {}", path);
    }

    Ok(())
}

// ============================================================================
// Revocation
// ============================================================================

#[tokio::test]
async fn test_disabled_admin_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;

    let disable = server
        .client()
        .delete(format!("{}/api/user/{}", server.url(), admin.identity.id))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(disable.status(), StatusCode::OK);

    let invite = server
        .client()
        .post(format!("{}/api/user", server.url()))
        .bearer_auth(&admin.token)
        .json(&serde_json::json!({
            "name": "Bob",
            "email": MEMBER_EMAIL,
            "role": "MEMBER",
            "team": "DESIGN",
        }))
        .send()
        .await?;
    assert_eq!(invite.status(), StatusCode::UNAUTHORIZED);

    let read = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(&admin.token)
        .send()
        .await?;
    assert_eq!(read.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_demoted_admin_token_loses_manage_routes() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;

    let demote = server
        .client()
        .put(format!("{}/api/user/{}", server.url(), admin.identity.id))
        .bearer_auth(&owner.token)
        .json(&serde_json::json!({ "name": "Admin", "role": "MEMBER" }))
        .send()
        .await?;
    assert_eq!(demote.status(), StatusCode::OK);

    let manage = server
        .client()
        .get(format!("{}/api/team", server.url()))
        .bearer_auth(&admin.token)
        .send()
        .await?;
    assert_eq!(manage.status(), StatusCode::FORBIDDEN);

    let read = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(&admin.token)
        .send()
        .await?;
    assert_eq!(read.status(), StatusCode::OK);

    Ok(())
}
