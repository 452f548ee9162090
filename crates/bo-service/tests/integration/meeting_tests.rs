//! E2E tests for meeting scheduling.
//!
//! The harness clock starts at 2024-01-10T10:00:00Z; meeting times below are
//! relative to that instant.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use bo_service::models::{Product, Role};
use bo_test_utils::{
    TestBackOfficeServer, TestSession, ADMIN_EMAIL, MEMBER_EMAIL, OTHER_OWNER_EMAIL,
    OWNER_EMAIL, SECOND_MEMBER_EMAIL,
};
use chrono::Duration;
use reqwest::StatusCode;
use serde_json::json;

async fn schedule(
    server: &TestBackOfficeServer,
    session: &TestSession,
    product: &Product,
    time: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .post(format!("{}/api/meeting", server.url()))
        .bearer_auth(&session.token)
        .json(&json!({ "product_id": product.id, "time": time }))
        .send()
        .await?)
}

// ============================================================================
// Schedule
// ============================================================================

#[tokio::test]
async fn test_schedule_meeting_returns_view_with_label() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    let response = schedule(&server, &owner, &product, "2024-01-10T10:30:00Z").await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["meeting_in"], "In 30 minutes");
    assert_eq!(body["meeting"]["product_id"], json!(product.id));
    assert_eq!(body["product"]["brand"], "Acme");

    Ok(())
}

#[tokio::test]
async fn test_schedule_meeting_labels_by_calendar() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    for (time, label) in [
        ("2024-01-10T15:00:00Z", "In 5 hours"),
        ("2024-01-11T09:00:00Z", "Tomorrow"),
        ("2024-01-15T09:00:00Z", "in 5 days"),
        ("2024-02-03T09:00:00Z", "Next month"),
        ("2024-05-01T09:00:00Z", "5/1/2024"),
    ] {
        let response = schedule(&server, &owner, &product, time).await?;
        assert_eq!(response.status(), StatusCode::CREATED, "{}", time);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["meeting_in"], label, "{}", time);
    }

    Ok(())
}

#[tokio::test]
async fn test_schedule_meeting_in_past_returns_400() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    let past = schedule(&server, &owner, &product, "2024-01-10T09:59:59Z").await?;
    assert_eq!(past.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = past.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_SCHEDULE");

    // Exactly now is not in the future
    let now = schedule(&server, &owner, &product, "2024-01-10T10:00:00Z").await?;
    assert_eq!(now.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_schedule_meeting_malformed_time_returns_400() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    let response = schedule(&server, &owner, &product, "next tuesday").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_schedule_same_slot_twice_returns_409() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let acme = server.seed_product(&owner.identity, "Acme", &[]).await?;
    let other = server.seed_product(&owner.identity, "Other", &[]).await?;

    let first = schedule(&server, &owner, &acme, "2024-01-12T09:00:00Z").await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let clash = schedule(&server, &owner, &acme, "2024-01-12T09:00:00Z").await?;
    assert_eq!(clash.status(), StatusCode::CONFLICT);

    // Same time, different product is a different slot
    let elsewhere = schedule(&server, &owner, &other, "2024-01-12T09:00:00Z").await?;
    assert_eq!(elsewhere.status(), StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn test_schedule_on_foreign_product_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let other = server.bootstrap_tenant(OTHER_OWNER_EMAIL).await?;
    let foreign = server.seed_product(&other.identity, "Globex", &[]).await?;

    let response = schedule(&server, &owner, &foreign, "2024-01-12T09:00:00Z").await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_member_lists_meetings_of_own_products_only() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;
    let mine = server
        .seed_product(&owner.identity, "Mine", &[&member.identity])
        .await?;
    let theirs = server.seed_product(&owner.identity, "Theirs", &[]).await?;

    schedule(&server, &owner, &mine, "2024-01-12T09:00:00Z").await?;
    schedule(&server, &owner, &theirs, "2024-01-12T10:00:00Z").await?;

    let member_view = server
        .client()
        .get(format!("{}/api/meeting", server.url()))
        .bearer_auth(&member.token)
        .send()
        .await?;
    assert_eq!(member_view.status(), StatusCode::OK);
    let body: serde_json::Value = member_view.json().await?;
    assert_eq!(body["meetings"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["meetings"][0]["product"]["brand"], "Mine");

    let owner_view = server
        .client()
        .get(format!("{}/api/meeting", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    let body: serde_json::Value = owner_view.json().await?;
    assert_eq!(body["meetings"].as_array().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_member_without_membership_cannot_read_meeting() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;
    let peer = server
        .seed_staff(&owner.identity, Role::Member, SECOND_MEMBER_EMAIL)
        .await?;
    let product = server
        .seed_product(&owner.identity, "Acme", &[&peer.identity])
        .await?;

    let created = schedule(&server, &owner, &product, "2024-01-12T09:00:00Z").await?;
    let body: serde_json::Value = created.json().await?;
    let id = body["meeting"]["id"].as_i64().unwrap_or_default();

    let denied = server
        .client()
        .get(format!("{}/api/meeting/{}", server.url(), id))
        .bearer_auth(&member.token)
        .send()
        .await?;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = server
        .client()
        .get(format!("{}/api/meeting/{}", server.url(), id))
        .bearer_auth(&peer.token)
        .send()
        .await?;
    assert_eq!(allowed.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_meeting_label_follows_clock() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    let created = schedule(&server, &owner, &product, "2024-01-11T09:00:00Z").await?;
    let body: serde_json::Value = created.json().await?;
    assert_eq!(body["meeting_in"], "Tomorrow");
    let id = body["meeting"]["id"].as_i64().unwrap_or_default();

    server.clock().advance(Duration::hours(20));

    let token = server.token_for(&owner.identity)?;
    let response = server
        .client()
        .get(format!("{}/api/meeting/{}", server.url(), id))
        .bearer_auth(token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["meeting_in"], "In 3 hours");

    Ok(())
}

// ============================================================================
// Update and disable
// ============================================================================

#[tokio::test]
async fn test_update_meeting_moves_slot() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    let created = schedule(&server, &admin, &product, "2024-01-12T09:00:00Z").await?;
    let body: serde_json::Value = created.json().await?;
    let id = body["meeting"]["id"].as_i64().unwrap_or_default();

    let moved = server
        .client()
        .put(format!("{}/api/meeting/{}", server.url(), id))
        .bearer_auth(&admin.token)
        .json(&json!({ "product_id": product.id, "time": "2024-01-13T09:00:00Z" }))
        .send()
        .await?;
    assert_eq!(moved.status(), StatusCode::OK);
    let body: serde_json::Value = moved.json().await?;
    assert_eq!(body["meeting"]["id"], json!(id));
    assert_eq!(body["meeting_in"], "in 3 days");

    // The old slot is free again
    let reuse = schedule(&server, &admin, &product, "2024-01-12T09:00:00Z").await?;
    assert_eq!(reuse.status(), StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn test_disable_meeting_hides_it() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    let created = schedule(&server, &owner, &product, "2024-01-12T09:00:00Z").await?;
    let body: serde_json::Value = created.json().await?;
    let id = body["meeting"]["id"].as_i64().unwrap_or_default();

    let disable = server
        .client()
        .delete(format!("{}/api/meeting/{}", server.url(), id))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(disable.status(), StatusCode::OK);
    let body: serde_json::Value = disable.json().await?;
    assert_eq!(body["status"], "DISABLED");

    let read = server
        .client()
        .get(format!("{}/api/meeting/{}", server.url(), id))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(read.status(), StatusCode::NOT_FOUND);

    // A disabled meeting no longer holds its slot
    let again = schedule(&server, &owner, &product, "2024-01-12T09:00:00Z").await?;
    assert_eq!(again.status(), StatusCode::CREATED);

    Ok(())
}
