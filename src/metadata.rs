//! Per-request description used by the client.

use http::Method;

/// Metadata for an individual HTTP request.
///
/// The path is made of `/`-separated segments appended to the client's base
/// URL, e.g. `content_delivery/configurations/1528252734`.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path, relative to the base URL.
    pub path: String,

    /// Username and password sent as basic auth instead of the token.
    pub basic_auth: Option<(String, String)>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            basic_auth: None,
        }
    }

    /// Authenticates this request with a username and password.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    /// The path split into its non-empty segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }
}
