//! Back Office error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Store,
//! crypto and signing failures are logged server-side and reported to the
//! client with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::JwtValidationError;
use serde::Serialize;
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn field_names(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Back Office error type.
///
/// Maps to HTTP status codes:
/// - Validation, InvalidSchedule: 400 Bad Request
/// - Authentication, InvalidToken: 401 Unauthorized
/// - Authorization, PermissionDenied: 403 Forbidden
/// - NotFound: 404 Not Found
/// - Conflict: 409 Conflict
/// - Store, Crypto, Signing: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum BoError {
    #[error("Validation failed: {}", field_names(.0))]
    Validation(Vec<FieldError>),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Role not permitted for this operation")]
    Authorization,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

impl BoError {
    /// Shorthand for a validation failure on one field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        BoError::Validation(vec![FieldError::new(field, message)])
    }

    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            BoError::Validation(_) | BoError::InvalidSchedule(_) => 400,
            BoError::Authentication(_) | BoError::InvalidToken(_) => 401,
            BoError::Authorization | BoError::PermissionDenied(_) => 403,
            BoError::NotFound(_) => 404,
            BoError::Conflict(_) => 409,
            BoError::Store(_) | BoError::Crypto(_) | BoError::Signing(_) => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl IntoResponse for BoError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            BoError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "One or more fields are invalid".to_string(),
                Some(fields),
            ),
            BoError::Authentication(reason) => {
                (StatusCode::UNAUTHORIZED, "AUTHENTICATION_FAILED", reason, None)
            }
            BoError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason, None)
            }
            BoError::Authorization => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Your role is not permitted to perform this operation".to_string(),
                None,
            ),
            BoError::PermissionDenied(reason) => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", reason, None)
            }
            BoError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource, None),
            BoError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason, None),
            BoError::InvalidSchedule(reason) => {
                (StatusCode::BAD_REQUEST, "INVALID_SCHEDULE", reason, None)
            }
            BoError::Store(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "bo.store", error = %err, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "An internal storage error occurred".to_string(),
                    None,
                )
            }
            BoError::Crypto(err) => {
                tracing::error!(target: "bo.crypto", error = %err, "Cryptographic operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CRYPTO_ERROR",
                    "An internal cryptographic error occurred".to_string(),
                    None,
                )
            }
            BoError::Signing(err) => {
                tracing::error!(target: "bo.token", error = %err, "Token signing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SIGNING_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                fields,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"back-office\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

/// Convert sqlx errors to BoError
impl From<sqlx::Error> for BoError {
    fn from(err: sqlx::Error) -> Self {
        BoError::Store(err.to_string())
    }
}

impl From<JwtValidationError> for BoError {
    fn from(err: JwtValidationError) -> Self {
        BoError::InvalidToken(err.to_string())
    }
}
