//! Team rosters.

use crate::errors::BoError;
use crate::models::{TeamListResponse, TeamResponse};
use crate::routes::AppState;
use crate::services::team_service;
use crate::services::token_service::SessionClaims;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// GET /api/team
#[instrument(skip_all, name = "bo.team.list")]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<TeamListResponse>, BoError> {
    let teams = team_service::list_teams(state.store.as_ref(), &claims.user).await?;
    Ok(Json(teams))
}

/// GET /api/team/:team
#[instrument(skip_all, name = "bo.team.get")]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    Path(team): Path<String>,
) -> Result<Json<TeamResponse>, BoError> {
    let team = team_service::get_team(state.store.as_ref(), &claims.user, &team).await?;
    Ok(Json(team))
}
