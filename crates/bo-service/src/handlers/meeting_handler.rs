//! Meeting scheduling.

use crate::errors::BoError;
use crate::handlers::{parse_body, IdPath};
use crate::models::{MeetingListResponse, MeetingRequest, MeetingView};
use crate::routes::AppState;
use crate::services::meeting_service;
use crate::services::token_service::SessionClaims;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use common::types::MeetingId;
use std::sync::Arc;
use tracing::instrument;

/// GET /api/meeting
#[instrument(skip_all, name = "bo.meeting.list")]
pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<MeetingListResponse>, BoError> {
    let meetings =
        meeting_service::list_meetings(state.store.as_ref(), &state.scheduler, &claims.user)
            .await?;
    Ok(Json(meetings))
}

/// GET /api/meeting/:id
#[instrument(skip_all, name = "bo.meeting.get")]
pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<MeetingId>,
) -> Result<Json<MeetingView>, BoError> {
    let meeting =
        meeting_service::get_meeting(state.store.as_ref(), &state.scheduler, &claims.user, id)
            .await?;
    Ok(Json(meeting))
}

/// Schedule a meeting on a product.
///
/// POST /api/meeting
///
/// # Response
///
/// - 201 Created: The meeting, its product and relative label
/// - 400 Bad Request: Invalid fields, malformed or past time
/// - 403 Forbidden: Product of another tenant
/// - 404 Not Found: Unknown or disabled product
/// - 409 Conflict: Slot already taken
#[instrument(skip_all, name = "bo.meeting.schedule")]
pub async fn schedule_meeting(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    body: Bytes,
) -> Result<(StatusCode, Json<MeetingView>), BoError> {
    let request: MeetingRequest = parse_body(&body)?;

    let meeting = meeting_service::schedule_meeting(
        state.store.as_ref(),
        &state.scheduler,
        &claims.user,
        request,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(meeting)))
}

/// PUT /api/meeting/:id
#[instrument(skip_all, name = "bo.meeting.update")]
pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<MeetingId>,
    body: Bytes,
) -> Result<Json<MeetingView>, BoError> {
    let request: MeetingRequest = parse_body(&body)?;

    let meeting = meeting_service::update_meeting(
        state.store.as_ref(),
        &state.scheduler,
        &claims.user,
        id,
        request,
    )
    .await?;
    Ok(Json(meeting))
}

/// DELETE /api/meeting/:id
#[instrument(skip_all, name = "bo.meeting.disable")]
pub async fn disable_meeting(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    IdPath(id): IdPath<MeetingId>,
) -> Result<Json<MeetingView>, BoError> {
    let meeting = meeting_service::disable_meeting(&state.scheduler, &claims.user, id).await?;
    Ok(Json(meeting))
}
