//! Route definitions for the CoreHR HTTP API.
//!
//! Routes are grouped by their guard requirements: public session
//! endpoints, authenticated self-service endpoints, and administrative
//! endpoints with role guards and audit capture.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use corehr_auth::guard::GuardStep;
use corehr_entity::user::UserRole;

use crate::handlers;
use crate::middleware;
use crate::middleware::audit::{AuditSpec, audited};
use crate::middleware::guard::guarded;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    Router::new()
        .merge(public_auth_routes())
        .merge(self_service_routes(&state))
        .merge(admin_user_routes(&state))
        .merge(audit_routes(&state))
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Session endpoints reachable without an access token.
fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/refresh-token", post(handlers::auth::refresh_token))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/2fa/verify", post(handlers::auth::verify_two_factor))
        .route(
            "/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route("/auth/reset-password", post(handlers::auth::reset_password))
}

/// Endpoints any authenticated user may call on their own account.
fn self_service_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/2fa/setup", post(handlers::auth::setup_two_factor))
        .route(
            "/auth/change-password",
            post(handlers::auth::change_password),
        );

    guarded(routes, state, vec![GuardStep::Authenticate])
}

/// Administrative user management. Reads and most mutations are open to
/// ADMIN and HR; role changes are ADMIN only. Every route is audited.
fn admin_user_routes(state: &AppState) -> Router<AppState> {
    let reads = audited(
        Router::new()
            .route("/auth/users", get(handlers::users::list_users))
            .route("/auth/users/{user_id}", get(handlers::users::get_user)),
        state,
        AuditSpec::access("user"),
    );

    let updates = audited(
        Router::new()
            .route(
                "/auth/users/{user_id}/status",
                patch(handlers::users::change_status),
            )
            .route(
                "/auth/users/{user_id}/reset-password",
                post(handlers::users::reset_password),
            ),
        state,
        AuditSpec::update("user"),
    );

    let admin_hr = guarded(
        reads.merge(updates),
        state,
        vec![
            GuardStep::Authenticate,
            GuardStep::RequireRole(vec![UserRole::Admin, UserRole::Hr]),
        ],
    );

    let role_change = guarded(
        audited(
            Router::new().route(
                "/auth/users/{user_id}/role",
                patch(handlers::users::change_role),
            ),
            state,
            AuditSpec::update("user"),
        ),
        state,
        vec![
            GuardStep::Authenticate,
            GuardStep::RequireRole(vec![UserRole::Admin]),
        ],
    );

    admin_hr.merge(role_change)
}

/// Audit log review, restricted to ADMIN and HR.
fn audit_routes(state: &AppState) -> Router<AppState> {
    guarded(
        Router::new().route("/audit", get(handlers::audit::search_audit)),
        state,
        vec![
            GuardStep::Authenticate,
            GuardStep::RequireRole(vec![UserRole::Admin, UserRole::Hr]),
        ],
    )
}

/// Health check endpoints (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Build CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use tower_http::cors::Any;

    let allowed = &state.config.server.allowed_origins;

    if allowed.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> =
            allowed.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
