//! Axum route for the chat relay

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router, routing};
use futures_util::StreamExt;
use pivothire_core::{HttpError, RequestContext};

use crate::error::ChatError;
use crate::relay::EventStream;
use crate::state::ChatState;
use crate::types::ChatRequest;

/// Build the chat router mounted at `path`
pub fn chat_router(state: ChatState, path: &str) -> Router {
    Router::new()
        .route(path, routing::post(chat_turn))
        .with_state(state)
}

/// Handle `POST <chat.path>`
///
/// A missing API key is reported before the body is looked at; the rest of
/// the checks run in [`ChatState::open_turn`].
async fn chat_turn(
    State(state): State<ChatState>,
    Extension(context): Extension<RequestContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    if !state.has_credential() {
        tracing::error!(request_id = %context.request_id, "refusing chat turn: missing API key");
        return error_response(&ChatError::MissingCredential);
    }

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(request_id = %context.request_id, error = %rejection.body_text(), "malformed chat request");
            return error_response(&ChatError::InvalidRequest(
                "Messages are required and must be a non-empty array.".to_owned(),
            ));
        }
    };

    match state.open_turn(request, &context).await {
        Ok(stream) => sse_response(stream),
        Err(e) => error_response(&e),
    }
}

/// Frame each event as a `data: <JSON>` record
fn sse_response(stream: EventStream) -> Response {
    let records = stream.map(|event| Event::default().json_data(event));

    (
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(records).keep_alive(KeepAlive::default()),
    )
        .into_response()
}

/// Render a chat error as `{"error": {"message", "type"}}`
fn error_response(error: &ChatError) -> Response {
    let status = error.status_code();
    let body = serde_json::json!({
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
        }
    });

    (status, Json(body)).into_response()
}
