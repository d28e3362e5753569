use uuid::Uuid;

/// Per-request context handed explicitly to handlers
///
/// Built by the server middleware for every request; nothing about the
/// caller is looked up from process-wide state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlates log lines of one request
    pub request_id: Uuid,
    /// HTTP request parts (method, URI, headers, extensions)
    pub parts: http::request::Parts,
    /// Signed-in user, when the identity header was present
    pub user: Option<SessionUser>,
}

impl RequestContext {
    /// Create a context from request parts
    pub fn new(parts: http::request::Parts, user: Option<SessionUser>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            parts,
            user,
        }
    }

    /// Create a minimal context for use outside an HTTP request
    ///
    /// Contains empty headers and no user
    pub fn empty() -> Self {
        let (parts, ()) = http::Request::new(()).into_parts();
        Self::new(parts, None)
    }

    /// Access request headers
    pub fn headers(&self) -> &http::HeaderMap {
        &self.parts.headers
    }

    /// Attach a user, replacing any existing one
    #[must_use]
    pub fn with_user(mut self, user: SessionUser) -> Self {
        self.user = Some(user);
        self
    }
}

/// Authenticated user forwarded by the session provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// Stable user identifier
    pub user_id: String,
}

impl SessionUser {
    /// Wrap a user id
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }
}
