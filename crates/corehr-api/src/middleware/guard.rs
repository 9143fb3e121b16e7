//! Runs a route's guard pipeline before its handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Extension;
use axum::Router;
use axum::extract::{RawPathParams, Request};
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;

use corehr_auth::guard::{GuardPipeline, GuardRequest, GuardStep};

use crate::error::ApiError;
use crate::state::AppState;

/// Mounts a guard pipeline with the given steps on every route added to
/// `router` so far. The pipeline runs before the handler; on success the
/// derived context lands in request extensions for the `AuthUser`
/// extractor.
pub fn guarded(
    router: Router<AppState>,
    state: &AppState,
    steps: Vec<GuardStep>,
) -> Router<AppState> {
    let pipeline = Arc::new(state.guard_pipeline(steps));
    router
        .route_layer(middleware::from_fn(enforce))
        .route_layer(Extension(pipeline))
}

/// Middleware applying the route's [`GuardPipeline`].
pub async fn enforce(
    params: RawPathParams,
    Extension(pipeline): Extension<Arc<GuardPipeline>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let guard_request = build_guard_request(&params, request.headers());
    let context = pipeline.authorize(&guard_request).await?;

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Assembles the transport-neutral guard view of the request.
fn build_guard_request(params: &RawPathParams, headers: &HeaderMap) -> GuardRequest {
    let bearer_token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from);

    let path_params: HashMap<String, String> = params
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    GuardRequest {
        bearer_token,
        path_params,
        ip_address: client_ip(headers),
        user_agent: headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    }
}

/// Best-effort client IP from the forwarding header.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("unknown")
        .to_string()
}
