//! `AuthUser` extractor — hands the guard-derived context to handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use corehr_auth::guard::RequestContext;
use corehr_core::error::AppError;

use crate::error::ApiError;

/// Authenticated request context available in handlers.
///
/// The guard middleware verifies the token and stashes the derived
/// [`RequestContext`] in request extensions; this extractor retrieves it.
/// Reaching a handler without a context means the route was mounted
/// without an `Authenticate` step, which is a configuration bug — the
/// request is rejected with 401, never silently admitted.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::authentication("Authentication required")))
    }
}
