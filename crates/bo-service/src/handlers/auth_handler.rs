//! Login and invited-user registration.

use crate::errors::BoError;
use crate::handlers::{parse_body, session_response};
use crate::models::{LoginRequest, RegisterRequest};
use crate::observability::metrics::record_error;
use crate::observability::ErrorCategory;
use crate::routes::AppState;
use crate::services::user_service;
use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};
use std::sync::Arc;
use tracing::instrument;

/// POST /api/user/login
///
/// Returns `{user}` with the session token in `Access-Token`, or 401.
#[instrument(skip_all, name = "bo.auth.login")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, BoError> {
    let request: LoginRequest = parse_body(&body)?;

    match user_service::login(state.store.as_ref(), &state.token_service, request).await {
        Ok(session) => session_response(StatusCode::OK, session),
        Err(e) => {
            let category = ErrorCategory::from(&e);
            record_error("login", category.as_str(), e.status_code());
            Err(e)
        }
    }
}

/// Activate an invited user.
///
/// POST /api/user/register
///
/// # Response
///
/// - 200 OK: `{user}` with the session token in `Access-Token`
/// - 403 Forbidden: E-mail does not match the invited id
/// - 404 Not Found: Unknown id
/// - 409 Conflict: Already registered
#[instrument(skip_all, name = "bo.auth.register")]
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, BoError> {
    let request: RegisterRequest = parse_body(&body)?;

    let result = user_service::register_user(
        state.store.as_ref(),
        &state.token_service,
        state.config.bcrypt_cost,
        request,
    )
    .await;

    match result {
        Ok(session) => session_response(StatusCode::OK, session),
        Err(e) => {
            let category = ErrorCategory::from(&e);
            record_error("register", category.as_str(), e.status_code());
            Err(e)
        }
    }
}
