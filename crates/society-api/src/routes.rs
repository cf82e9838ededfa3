//! Router assembly

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// All routes with request tracing; CORS is left to the binary.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/request-admin-otp", post(handlers::auth::request_admin_otp))
        .route("/register-admin", post(handlers::auth::register_admin))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me));

    let invite_routes = Router::new()
        .route("/request-invite-otp", post(handlers::invites::request_invite_otp))
        .route("/generate", post(handlers::invites::generate))
        .route("/accept", post(handlers::invites::accept));

    let admin_routes = Router::new()
        .route("/property", get(handlers::admin::property))
        .route("/complete-enrollment", post(handlers::admin::complete_enrollment))
        .route("/available-units", get(handlers::admin::available_units))
        .route("/occupied-units", get(handlers::admin::occupied_units))
        .route("/units", get(handlers::admin::units));

    let guard_routes = Router::new().route("/occupied-units", get(handlers::admin::occupied_units));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/auth", auth_routes)
        .route("/api/invites", get(handlers::invites::list))
        .nest("/api/invites", invite_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/guard", guard_routes)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
}
