//! Audit capture middleware.
//!
//! Wraps a route so that, once the response is finalized with a 2xx
//! status, a structured audit entry is captured and handed to the
//! recorder's bounded queue. Failed operations are not audited. The
//! request is never delayed by persistence: capture is a synchronous
//! field snapshot plus a non-blocking enqueue.

use axum::Extension;
use axum::Router;
use axum::extract::{RawPathParams, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use serde_json::{Value, json};

use corehr_auth::guard::RequestContext;
use corehr_entity::audit::AuditAction;
use corehr_service::audit::AuditEvent;

use crate::state::AppState;

use super::guard::client_ip;

/// Per-route audit classification: which action and resource an entry
/// for this route describes.
#[derive(Debug, Clone, Copy)]
pub struct AuditSpec {
    /// The action category recorded for this route.
    pub action: AuditAction,
    /// The resource kind recorded for this route.
    pub resource: &'static str,
}

impl AuditSpec {
    /// Access (read) of the given resource kind.
    pub fn access(resource: &'static str) -> Self {
        Self {
            action: AuditAction::Access,
            resource,
        }
    }

    /// Creation of the given resource kind.
    pub fn create(resource: &'static str) -> Self {
        Self {
            action: AuditAction::Create,
            resource,
        }
    }

    /// Update of the given resource kind.
    pub fn update(resource: &'static str) -> Self {
        Self {
            action: AuditAction::Update,
            resource,
        }
    }

    /// Deletion of the given resource kind.
    pub fn delete(resource: &'static str) -> Self {
        Self {
            action: AuditAction::Delete,
            resource,
        }
    }
}

/// Before/after resource state a handler wants recorded. Handlers insert
/// this into response extensions; absent means no values are logged.
#[derive(Debug, Clone, Default)]
pub struct AuditValues {
    /// Resource state before the operation.
    pub old_values: Option<Value>,
    /// Resource state after the operation.
    pub new_values: Option<Value>,
}

/// Mounts audit capture with the given spec on every route added to
/// `router` so far. Must sit inside the guard layer so the request
/// context is already present.
pub fn audited(router: Router<AppState>, state: &AppState, spec: AuditSpec) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(state.clone(), capture))
        .route_layer(Extension(spec))
}

/// Middleware capturing an audit entry after a successful response.
pub async fn capture(
    State(state): State<AppState>,
    params: RawPathParams,
    Extension(spec): Extension<AuditSpec>,
    request: Request,
    next: Next,
) -> Response {
    // Snapshot request fields up front; the handler consumes the request.
    let metadata = json!({
        "method": request.method().as_str(),
        "path": request.uri().path(),
        "query": request.uri().query(),
        "user_agent": request
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok()),
    });
    let ip_address = client_ip(request.headers());
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let user_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.user_id);
    let resource_id = resource_id_from_params(&params);

    let response = next.run(request).await;

    // Only successful operations are audited.
    if !response.status().is_success() {
        return response;
    }

    let values = response
        .extensions()
        .get::<AuditValues>()
        .cloned()
        .unwrap_or_default();

    let event = AuditEvent {
        user_id,
        resource: spec.resource.to_string(),
        resource_id,
        old_values: values.old_values,
        new_values: values.new_values,
        metadata: Some(metadata),
        ip_address: Some(ip_address),
        user_agent,
    };

    match spec.action {
        AuditAction::Access => state.audit_recorder.record_access(event),
        AuditAction::Create => state.audit_recorder.record_create(event),
        AuditAction::Update => state.audit_recorder.record_update(event),
        AuditAction::Delete => state.audit_recorder.record_delete(event),
    }

    response
}

/// The conventional identifier parameters, in precedence order.
fn resource_id_from_params(params: &RawPathParams) -> Option<String> {
    for name in ["user_id", "employee_id", "id"] {
        if let Some((_, value)) = params.iter().find(|(n, _)| *n == name) {
            return Some(value.to_string());
        }
    }
    None
}
