//! User management.

use crate::errors::BoError;
use crate::handlers::{parse_body, IdPath};
use crate::models::{Identity, InviteUserRequest, UpdateUserRequest, UserListResponse};
use crate::routes::AppState;
use crate::services::token_service::SessionClaims;
use crate::services::user_service;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use common::types::UserId;
use std::sync::Arc;
use tracing::instrument;

/// GET /api/user
#[instrument(skip_all, name = "bo.user.list")]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<UserListResponse>, BoError> {
    let users = user_service::list_users(state.store.as_ref(), &claims.user).await?;
    Ok(Json(users))
}

/// GET /api/user/:id
#[instrument(skip_all, name = "bo.user.get")]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<UserId>,
) -> Result<Json<Identity>, BoError> {
    let user = user_service::get_user(state.store.as_ref(), &claims.user, id).await?;
    Ok(Json(user))
}

/// Invite a user into the caller's tenant.
///
/// POST /api/user
#[instrument(skip_all, name = "bo.user.invite")]
pub async fn invite_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    body: Bytes,
) -> Result<(StatusCode, Json<Identity>), BoError> {
    let request: InviteUserRequest = parse_body(&body)?;

    let user = user_service::invite_user(state.store.as_ref(), &claims.user, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/user/:id
#[instrument(skip_all, name = "bo.user.update")]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<UserId>,
    body: Bytes,
) -> Result<Json<Identity>, BoError> {
    let request: UpdateUserRequest = parse_body(&body)?;

    let user = user_service::update_user(
        state.store.as_ref(),
        state.config.bcrypt_cost,
        &claims.user,
        id,
        request,
    )
    .await?;
    Ok(Json(user))
}

/// DELETE /api/user/:id
///
/// Deactivates the user; the record is kept.
#[instrument(skip_all, name = "bo.user.disable")]
pub async fn disable_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<UserId>,
) -> Result<Json<Identity>, BoError> {
    let user = user_service::disable_user(state.store.as_ref(), &claims.user, id).await?;
    Ok(Json(user))
}
