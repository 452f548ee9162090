//! E2E tests for user administration.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use bo_service::models::Role;
use bo_test_utils::{
    TestBackOfficeServer, ADMIN_EMAIL, MEMBER_EMAIL, OTHER_OWNER_EMAIL, OWNER_EMAIL,
    SECOND_MEMBER_EMAIL, TEST_PASSWORD,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Listing and reads
// ============================================================================

#[tokio::test]
async fn test_list_users_splits_active_and_inactive() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;

    let invite = server
        .client()
        .post(format!("{}/api/user", server.url()))
        .bearer_auth(&owner.token)
        .json(&json!({
            "name": "Pending",
            "email": MEMBER_EMAIL,
            "role": "MEMBER",
            "team": "MARKETING",
        }))
        .send()
        .await?;
    assert_eq!(invite.status(), StatusCode::CREATED);

    // A user of another tenant never shows up
    let other = server.bootstrap_tenant(OTHER_OWNER_EMAIL).await?;
    server
        .seed_staff(&other.identity, Role::Member, "staff@globex.com")
        .await?;

    let response = server
        .client()
        .get(format!("{}/api/user", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let active = body["active_users"].as_array().map(Vec::len);
    let inactive = body["inactive_users"].as_array().map(Vec::len);
    assert_eq!(active, Some(2), "owner and admin are active");
    assert_eq!(inactive, Some(1), "the invitee is inactive");

    Ok(())
}

#[tokio::test]
async fn test_member_reading_admin_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;
    let peer = server
        .seed_staff(&owner.identity, Role::Member, SECOND_MEMBER_EMAIL)
        .await?;

    let read_admin = server
        .client()
        .get(format!("{}/api/user/{}", server.url(), admin.identity.id))
        .bearer_auth(&member.token)
        .send()
        .await?;
    assert_eq!(read_admin.status(), StatusCode::FORBIDDEN);

    let read_peer = server
        .client()
        .get(format!("{}/api/user/{}", server.url(), peer.identity.id))
        .bearer_auth(&member.token)
        .send()
        .await?;
    assert_eq!(read_peer.status(), StatusCode::OK);

    let read_self = server
        .client()
        .get(format!("{}/api/user/{}", server.url(), member.identity.id))
        .bearer_auth(&member.token)
        .send()
        .await?;
    assert_eq!(read_self.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_read_user_of_other_tenant_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let other = server.bootstrap_tenant(OTHER_OWNER_EMAIL).await?;

    let response = server
        .client()
        .get(format!("{}/api/user/{}", server.url(), other.identity.id))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_read_unknown_user_returns_404() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let response = server
        .client()
        .get(format!("{}/api/user/999999", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

// ============================================================================
// Invite
// ============================================================================

#[tokio::test]
async fn test_admin_invites_super_admin_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;

    let response = server
        .client()
        .post(format!("{}/api/user", server.url()))
        .bearer_auth(&admin.token)
        .json(&json!({
            "name": "Boss",
            "email": MEMBER_EMAIL,
            "role": "SUPER_ADMIN",
            "team": "DESIGN",
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_invite_existing_email_returns_409() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    let response = server
        .client()
        .post(format!("{}/api/user", server.url()))
        .bearer_auth(&owner.token)
        .json(&json!({
            "name": "Twin",
            "email": MEMBER_EMAIL,
            "role": "MEMBER",
            "team": "DESIGN",
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_invite_invalid_role_and_team_returns_400() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let response = server
        .client()
        .post(format!("{}/api/user", server.url()))
        .bearer_auth(&owner.token)
        .json(&json!({
            "name": "Bob",
            "email": MEMBER_EMAIL,
            "role": "OWNER",
            "team": "SALES",
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    let fields = body["error"]["fields"].as_array().map(Vec::len);
    assert_eq!(fields, Some(2));

    Ok(())
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_user_changes_name_role_and_team() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    let response = server
        .client()
        .put(format!("{}/api/user/{}", server.url(), member.identity.id))
        .bearer_auth(&owner.token)
        .json(&json!({
            "name": "Promoted",
            "role": "ADMIN",
            "team": "MARKETING",
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["name"], "Promoted");
    assert_eq!(body["role"], "ADMIN");
    assert_eq!(body["team"], "MARKETING");

    Ok(())
}

#[tokio::test]
async fn test_super_admin_role_cannot_be_changed() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let response = server
        .client()
        .put(format!("{}/api/user/{}", server.url(), owner.identity.id))
        .bearer_auth(&owner.token)
        .json(&json!({ "name": "Demoted", "role": "MEMBER" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_self_update_changes_password() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;

    let response = server
        .client()
        .put(format!("{}/api/user/{}", server.url(), admin.identity.id))
        .bearer_auth(&admin.token)
        .json(&json!({
            "name": "Admin",
            "role": "ADMIN",
            "password": "a-brand-new-password",
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let old = server
        .client()
        .post(format!("{}/api/user/login", server.url()))
        .json(&json!({ "email": ADMIN_EMAIL, "password": TEST_PASSWORD }))
        .send()
        .await?;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = server
        .client()
        .post(format!("{}/api/user/login", server.url()))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "a-brand-new-password" }))
        .send()
        .await?;
    assert_eq!(new.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_password_in_update_of_other_user_is_ignored() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    let response = server
        .client()
        .put(format!("{}/api/user/{}", server.url(), member.identity.id))
        .bearer_auth(&owner.token)
        .json(&json!({
            "name": "Member",
            "role": "MEMBER",
            "password": "hijacked-password",
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let login = server
        .client()
        .post(format!("{}/api/user/login", server.url()))
        .json(&json!({ "email": MEMBER_EMAIL, "password": TEST_PASSWORD }))
        .send()
        .await?;
    assert_eq!(login.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Disable
// ============================================================================

#[tokio::test]
async fn test_disable_self_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let response = server
        .client()
        .delete(format!("{}/api/user/{}", server.url(), owner.identity.id))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_admin_disabling_super_admin_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;

    let response = server
        .client()
        .delete(format!("{}/api/user/{}", server.url(), owner.identity.id))
        .bearer_auth(&admin.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_disable_twice_succeeds() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    for _ in 0..2 {
        let response = server
            .client()
            .delete(format!("{}/api/user/{}", server.url(), member.identity.id))
            .bearer_auth(&owner.token)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["active"], false);
    }

    Ok(())
}

// ============================================================================
// Path ids
// ============================================================================

#[tokio::test]
async fn test_non_numeric_id_returns_400_validation_error() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    for path in ["/api/user/abc", "/api/product/abc", "/api/meeting/abc"] {
        let response = server
            .client()
            .get(format!("{}{}", server.url(), path))
            .bearer_auth(&owner.token)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "GET {}", path);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "GET {}", path);
        assert_eq!(body["error"]["fields"][0]["field"], "id", "GET {}", path);
    }

    Ok(())
}
