use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderName;
use pivothire_core::SessionUser;

/// Middleware that reads the signed-in user from a trusted header
///
/// The session provider in front of the service sets the header; a missing,
/// blank, or non-ASCII value leaves the request anonymous.
pub async fn identity_middleware(header: HeaderName, mut request: Request, next: Next) -> Response {
    if let Some(user) = extract_user(&header, &request) {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

fn extract_user(header: &HeaderName, request: &Request) -> Option<SessionUser> {
    let value = request.headers().get(header)?.to_str().ok()?.trim();

    if value.is_empty() {
        None
    } else {
        Some(SessionUser::new(value))
    }
}
