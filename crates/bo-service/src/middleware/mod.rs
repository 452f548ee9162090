//! HTTP middleware for the Back Office service.
//!
//! - `auth` - authentication and role gate
//! - `http_metrics` - request metrics for every response

pub mod auth;
pub mod http_metrics;

pub use auth::{require_auth, require_roles, AuthState, MANAGE_ROLES, READ_ROLES};
pub use http_metrics::http_metrics_middleware;
