//! Transport-neutral view of an inbound request, as seen by the guard.

use std::collections::HashMap;

/// The slice of an inbound request the guard pipeline needs: the bearer
/// token, path parameters, and provenance. Building this is the HTTP
/// layer's job; the pipeline itself never touches the web framework.
#[derive(Debug, Clone, Default)]
pub struct GuardRequest {
    /// The token from the `Authorization: Bearer …` header, if present.
    pub bearer_token: Option<String>,
    /// Path parameters by name.
    pub path_params: HashMap<String, String>,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl GuardRequest {
    /// Creates an empty request (useful in tests).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Adds a path parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Looks up a path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }
}
