//! Two-stage request gate.
//!
//! - `require_auth` - global authentication. Every request outside
//!   [`PUBLIC_ENDPOINTS`] must carry a valid session token whose identity is
//!   still active in the store. The claims, refreshed from the stored
//!   identity, are placed in the request extensions.
//! - `require_roles` - per-route role check against the authenticated claims.
//!
//! Ownership and tenancy checks are not done here; they belong to the
//! operations themselves.

use crate::errors::BoError;
use crate::models::Role;
use crate::observability::metrics::record_gate_decision;
use crate::repositories::Store;
use crate::services::token_service::{SessionClaims, TokenService, INVALID_TOKEN_MESSAGE};
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Routes reachable without a session token.
pub const PUBLIC_ENDPOINTS: &[(&str, &str)] = &[
    ("POST", "/api/admin"),
    ("POST", "/api/user/login"),
    ("POST", "/api/user/register"),
    ("GET", "/health"),
    ("GET", "/metrics"),
];

/// Every role. Used for read routes.
pub const READ_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Member];

/// SUPER_ADMIN and ADMIN. Used for mutating routes and team rosters.
pub const MANAGE_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin];

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub token_service: Arc<TokenService>,

    /// Identities are re-read on every request so that disabling a user or
    /// changing its role applies to sessions already issued.
    pub store: Arc<dyn Store>,
}

pub fn is_public(method: &Method, path: &str) -> bool {
    PUBLIC_ENDPOINTS
        .iter()
        .any(|(m, p)| *m == method.as_str() && *p == path)
}

fn extract_bearer_token(req: &Request) -> Result<&str, BoError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "bo.middleware.auth", "Missing Authorization header");
            BoError::InvalidToken("Missing Authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "bo.middleware.auth", "Invalid Authorization header format");
        BoError::InvalidToken("Invalid Authorization header format".to_string())
    })
}

/// Global authentication layer.
///
/// # Response
///
/// - Passes public endpoints through untouched
/// - Returns 401 Unauthorized if the token is missing or invalid
/// - Returns 401 Unauthorized if the identity no longer exists or is disabled
/// - Continues with [`SessionClaims`] in extensions otherwise
#[instrument(skip_all, name = "bo.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, BoError> {
    if is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let mut claims = match extract_bearer_token(&req).and_then(|t| state.token_service.verify(t)) {
        Ok(claims) => claims,
        Err(e) => {
            record_gate_decision("authentication", "rejected");
            return Err(e);
        }
    };

    match state.store.find_identity(claims.user.id).await? {
        Some(current) if current.active => claims.user = current,
        _ => {
            tracing::debug!(
                target: "bo.middleware.auth",
                user_id = %claims.user.id,
                "Session identity missing or disabled"
            );
            record_gate_decision("authentication", "rejected");
            return Err(BoError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
        }
    }

    record_gate_decision("authentication", "allowed");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Per-route role check. Must run behind [`require_auth`].
///
/// # Response
///
/// - Returns 401 Unauthorized if no claims are attached
/// - Returns 403 Forbidden if the caller's role is not in `roles`
#[instrument(skip_all, name = "bo.middleware.roles")]
pub async fn require_roles(
    State(roles): State<&'static [Role]>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, BoError> {
    let role = req
        .extensions()
        .get::<SessionClaims>()
        .map(|c| c.user.role)
        .ok_or_else(|| BoError::Authentication("Authentication required".to_string()))?;

    if !roles.contains(&role) {
        tracing::debug!(target: "bo.middleware.roles", role = %role, "Role not permitted");
        record_gate_decision("authorization", "rejected");
        return Err(BoError::Authorization);
    }

    record_gate_decision("authorization", "allowed");
    Ok(next.run(req).await)
}
