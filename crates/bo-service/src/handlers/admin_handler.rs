//! Tenant bootstrap.

use crate::errors::BoError;
use crate::handlers::{parse_body, session_response};
use crate::models::BootstrapRequest;
use crate::routes::AppState;
use crate::services::user_service;
use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};
use std::sync::Arc;
use tracing::instrument;

/// Create a tenant and its SUPER_ADMIN.
///
/// POST /api/admin
///
/// # Response
///
/// - 201 Created: `{user}` with the session token in `Access-Token`
/// - 400 Bad Request: Invalid fields
/// - 409 Conflict: E-mail already registered
#[instrument(skip_all, name = "bo.admin.bootstrap")]
pub async fn handle_bootstrap(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, BoError> {
    let request: BootstrapRequest = parse_body(&body)?;

    let session = user_service::bootstrap_tenant(
        state.store.as_ref(),
        &state.token_service,
        state.config.bcrypt_cost,
        request,
    )
    .await?;

    session_response(StatusCode::CREATED, session)
}
