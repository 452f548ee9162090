//! HTTP request handlers for the Back Office service.

pub mod admin_handler;
pub mod auth_handler;
pub mod health;
pub mod meeting_handler;
pub mod metrics;
pub mod product_handler;
pub mod team_handler;
pub mod user_handler;

use crate::errors::BoError;
use crate::models::SessionResponse;
use crate::services::user_service::Session;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

/// Response header carrying a freshly issued session token.
pub const ACCESS_TOKEN_HEADER: &str = "access-token";

/// Numeric id path segment. A segment that does not parse is a 400
/// validation error on `id` instead of Axum's plain-text rejection.
pub struct IdPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = BoError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| IdPath(id))
            .map_err(|e| {
                tracing::debug!(target: "bo.handlers", error = %e, "Invalid path id");
                BoError::invalid_field("id", "Id must be a number")
            })
    }
}

/// Deserialize a JSON body by hand so malformed input is a 400 validation
/// error instead of Axum's default 422.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, BoError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "bo.handlers", error = %e, "Invalid request body");
        BoError::invalid_field("body", "Invalid request body")
    })
}

/// `{user}` body with the token in the `Access-Token` header.
pub(crate) fn session_response(status: StatusCode, session: Session) -> Result<Response, BoError> {
    let token = HeaderValue::from_str(&session.token)
        .map_err(|e| BoError::Signing(format!("Token is not a valid header value: {}", e)))?;

    let mut response = (
        status,
        Json(SessionResponse {
            user: session.identity,
        }),
    )
        .into_response();
    response.headers_mut().insert(ACCESS_TOKEN_HEADER, token);
    Ok(response)
}
