//! Request context derived from a verified access token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use corehr_entity::user::UserRole;

use crate::token::AccessClaims;

/// Identity and provenance of the current request.
///
/// Derived per request from a verified access token; never persisted.
/// Lives exactly as long as the request it describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's linked employee record, if any.
    pub employee_id: Option<Uuid>,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Builds a context from verified access-token claims and request
    /// provenance.
    pub fn from_claims(
        claims: &AccessClaims,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id: claims.sub,
            employee_id: claims.employee_id,
            role: claims.role,
            ip_address,
            user_agent,
        }
    }

    /// Whether the caller's role bypasses ownership checks.
    pub fn bypasses_ownership(&self) -> bool {
        self.role.bypasses_ownership()
    }
}
