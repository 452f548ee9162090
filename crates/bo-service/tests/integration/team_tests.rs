//! E2E tests for team rosters.

use bo_service::models::Role;
use bo_test_utils::{TestBackOfficeServer, ADMIN_EMAIL, MEMBER_EMAIL, OWNER_EMAIL};
use reqwest::StatusCode;

#[tokio::test]
async fn test_list_teams_returns_every_team() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    server
        .seed_staff(&owner.identity, Role::Admin, ADMIN_EMAIL)
        .await?;

    let response = server
        .client()
        .get(format!("{}/api/team", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    for team in ["DESIGN", "MARKETING", "DEVELOPMENT"] {
        assert!(body["teams"][team].is_array(), "{} should be listed", team);
    }
    assert_eq!(body["teams"]["DESIGN"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_get_team_returns_members_of_that_team() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;
    let member = server
        .seed_staff(&owner.identity, Role::Member, MEMBER_EMAIL)
        .await?;

    let response = server
        .client()
        .get(format!("{}/api/team/DESIGN", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["team"], "DESIGN");
    let ids: Vec<i64> = body["users"]
        .as_array()
        .map(|u| u.iter().filter_map(|i| i["id"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![member.identity.id.get()]);

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_team_returns_400() -> Result<(), anyhow::Error> {
    let server = TestBackOfficeServer::spawn().await?;
    let owner = server.bootstrap_tenant(OWNER_EMAIL).await?;

    let response = server
        .client()
        .get(format!("{}/api/team/SALES", server.url()))
        .bearer_auth(&owner.token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
