//! HTTP routes for the Back Office service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers::{
    admin_handler, auth_handler, health, meeting_handler, metrics, product_handler, team_handler,
    user_handler,
};
use crate::middleware::{
    http_metrics_middleware, require_auth, require_roles, AuthState, MANAGE_ROLES, READ_ROLES,
};
use crate::repositories::Store;
use crate::services::meeting_scheduler::MeetingScheduler;
use crate::services::token_service::TokenService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,

    /// Session token signing and verification.
    pub token_service: Arc<TokenService>,

    pub scheduler: Arc<MeetingScheduler>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// - `/health`, `/metrics` - operational, public
/// - `POST /api/admin`, `POST /api/user/login`, `POST /api/user/register` -
///   public, issue session tokens
/// - `/api/user`, `/api/product`, `/api/team`, `/api/meeting` - authenticated,
///   each route gated by a role set
/// - TraceLayer for request logging, 30 second request timeout
/// - HTTP metrics middleware (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        token_service: state.token_service.clone(),
        store: state.store.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/admin", post(admin_handler::handle_bootstrap))
        .route("/api/user/login", post(auth_handler::handle_login))
        .route("/api/user/register", post(auth_handler::handle_register))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(metrics_handle);

    // Open to every authenticated role
    let read_routes = Router::new()
        .route("/api/user/:id", get(user_handler::get_user))
        .route("/api/product", get(product_handler::list_products))
        .route("/api/product/:id", get(product_handler::get_product))
        .route("/api/meeting", get(meeting_handler::list_meetings))
        .route("/api/meeting/:id", get(meeting_handler::get_meeting))
        .route_layer(middleware::from_fn_with_state(READ_ROLES, require_roles))
        .with_state(state.clone());

    // SUPER_ADMIN and ADMIN only
    let manage_routes = Router::new()
        .route(
            "/api/user",
            get(user_handler::list_users).post(user_handler::invite_user),
        )
        .route(
            "/api/user/:id",
            axum::routing::put(user_handler::update_user).delete(user_handler::disable_user),
        )
        .route("/api/product", post(product_handler::create_product))
        .route(
            "/api/product/:id",
            axum::routing::put(product_handler::update_product)
                .delete(product_handler::disable_product),
        )
        .route("/api/team", get(team_handler::list_teams))
        .route("/api/team/:team", get(team_handler::get_team))
        .route("/api/meeting", post(meeting_handler::schedule_meeting))
        .route(
            "/api/meeting/:id",
            axum::routing::put(meeting_handler::update_meeting)
                .delete(meeting_handler::disable_meeting),
        )
        .route_layer(middleware::from_fn_with_state(MANAGE_ROLES, require_roles))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. require_auth - authenticate everything outside the public list
    // 2. TimeoutLayer
    // 3. TraceLayer
    // 4. http_metrics_middleware - record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(read_routes)
        .merge(manage_routes)
        .layer(middleware::from_fn_with_state(auth_state, require_auth))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(http_metrics_middleware))
}
