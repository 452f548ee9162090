//! E2E tests for the product catalog.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use bo_service::models::Role;
use bo_test_utils::{
    TestBackOfficeServer, ADMIN_EMAIL, MEMBER_EMAIL, OTHER_OWNER_EMAIL, OWNER_EMAIL,
    SECOND_MEMBER_EMAIL,
};
use reqwest::StatusCode;
use serde_json::json;

fn brands(body: &serde_json::Value) -> Vec<String> {
    let mut brands: Vec<String> = body["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .filter_map(|p| p["brand"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    brands.sort();
    brands
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_product_happy_path() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    let response = server
        .client()
        .post(format!("{}/api/product", server.url()))
        .bearer_auth(&owner.token)
        .json(&json!({
            "brand": "Acme Rockets",
            "description": "  Fast rockets  ",
            "categories": ["SPORTS", "ELECTRONICS"],
            "tags": ["fast", " fast ", ""],
            "members": [member.identity.id],
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["brand"], "Acme Rockets");
    assert_eq!(body["description"], "Fast rockets");
    assert_eq!(body["active"], true);
    assert_eq!(body["owner_tenant_id"], json!(owner.identity.id));
    assert_eq!(body["tags"], json!(["fast"]));
    assert_eq!(body["members"], json!([member.identity.id]));

    Ok(())
}

#[tokio::test]
async fn test_create_product_duplicate_brand_returns_409() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    server.seed_product(&owner.identity, "Acme", &[]).await?;

    let response = server
        .client()
        .post(format!("{}/api/product", server.url()))
        .bearer_auth(&owner.token)
        .json(&json!({ "brand": "Acme" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_same_brand_in_two_tenants_is_allowed() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let other = server.bootstrap_tenant(OTHER_OWNER_EMAIL).await?;
    server.seed_product(&owner.identity, "Acme", &[]).await?;

    let response = server
        .client()
        .post(format!("{}/api/product", server.url()))
        .bearer_auth(&other.token)
        .json(&json!({ "brand": "Acme" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn test_create_product_with_foreign_member_returns_400() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let other = server.bootstrap_tenant(OTHER_OWNER_EMAIL).await?;

    let response = server
        .client()
        .post(format!("{}/api/product", server.url()))
        .bearer_auth(&owner.token)
        .json(&json!({
            "brand": "Acme",
            "categories": ["GADGETS"],
            "members": [other.identity.id],
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    let fields: Vec<&str> = body["error"]["fields"]
        .as_array()
        .map(|f| f.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default();
    assert!(fields.contains(&"members"));
    assert!(fields.contains(&"categories"));

    Ok(())
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_member_sees_only_own_products() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;
    server
        .seed_product(&owner.identity, "Mine", &[&member.identity])
        .await?;
    let theirs = server.seed_product(&owner.identity, "Theirs", &[]).await?;

    let list = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(&member.token)
        .send()
        .await?;
    assert_eq!(list.status(), StatusCode::OK);
    assert_eq!(brands(&list.json().await?), vec!["Mine".to_string()]);

    let read_theirs = server
        .client()
        .get(format!("{}/api/product/{}", server.url(), theirs.id))
        .bearer_auth(&member.token)
        .send()
        .await?;
    assert_eq!(read_theirs.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_member_without_membership_sees_full_list() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;
    let peer = server
        .seed_staff(&owner.identity, Role::Member, SECOND_MEMBER_EMAIL)
        .await?;
    server
        .seed_product(&owner.identity, "A", &[&peer.identity])
        .await?;
    server.seed_product(&owner.identity, "B", &[]).await?;

    let list = server
        .client()
        .get(format!("{}/api/product", server.url()))
        .bearer_auth(&member.token)
        .send()
        .await?;

    assert_eq!(list.status(), StatusCode::OK);
    assert_eq!(
        brands(&list.json().await?),
        vec!["A".to_string(), "B".to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn test_product_of_other_tenant_returns_403() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let other = server.bootstrap_tenant(OTHER_OWNER_EMAIL).await?;
    let foreign = server.seed_product(&other.identity, "Globex", &[]).await?;

    let response = server
        .client()
        .get(format!("{}/api/product/{}", server.url(), foreign.id))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

// ============================================================================
// Update and disable
// ============================================================================

#[tokio::test]
async fn test_update_product_keeps_absent_fields() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let admin = server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;
    let product = server
        .seed_product(&owner.identity, "Acme", &[&admin.identity])
        .await?;

    let response = server
        .client()
        .put(format!("{}/api/product/{}", server.url(), product.id))
        .bearer_auth(&admin.token)
        .json(&json!({ "brand": "Acme", "description": "Updated" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["brand"], "Acme");
    assert_eq!(body["description"], "Updated");
    assert_eq!(body["members"], json!([admin.identity.id]));

    Ok(())
}

#[tokio::test]
async fn test_update_product_to_taken_brand_returns_409() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    server.seed_product(&owner.identity, "Acme", &[]).await?;
    let other = server.seed_product(&owner.identity, "Other", &[]).await?;

    let taken = server
        .client()
        .put(format!("{}/api/product/{}", server.url(), other.id))
        .bearer_auth(&owner.token)
        .json(&json!({ "brand": "Acme" }))
        .send()
        .await?;
    assert_eq!(taken.status(), StatusCode::CONFLICT);

    // Re-saving its own brand is not a conflict
    let same = server
        .client()
        .put(format!("{}/api/product/{}", server.url(), other.id))
        .bearer_auth(&owner.token)
        .json(&json!({ "brand": "Other" }))
        .send()
        .await?;
    assert_eq!(same.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_disabled_product_disappears_and_frees_brand() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let product = server.seed_product(&owner.identity, "Acme", &[]).await?;

    let disable = server
        .client()
        .delete(format!("{}/api/product/{}", server.url(), product.id))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(disable.status(), StatusCode::OK);
    let body: serde_json::Value = disable.json().await?;
    assert_eq!(body["active"], false);

    let read = server
        .client()
        .get(format!("{}/api/product/{}", server.url(), product.id))
        .bearer_auth(&owner.token)
        .send()
        .await?;
    assert_eq!(read.status(), StatusCode::NOT_FOUND);

    let recreate = server
        .client()
        .post(format!("{}/api/product", server.url()))
        .bearer_auth(&owner.token)
        .json(&json!({ "brand": "Acme" }))
        .send()
        .await?;
    assert_eq!(recreate.status(), StatusCode::CREATED);

    Ok(())
}
