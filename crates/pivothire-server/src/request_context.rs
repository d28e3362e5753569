use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use pivothire_core::{RequestContext, SessionUser};

/// Middleware that builds the `RequestContext` handed to handlers
///
/// Picks up the `SessionUser` left by the identity middleware, if any.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let user = parts.extensions.get::<SessionUser>().cloned();
    let context = RequestContext::new(parts.clone(), user);

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(context);

    next.run(request).await
}
