//! Mock chat-completion backend for integration tests
//!
//! Speaks just enough of the OpenAI streaming API to replay a scripted
//! [`Scenario`] and records every request it receives.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// What the mock streams back for every completion request
#[derive(Debug, Clone)]
pub enum Scenario {
    /// Assistant text, one chunk per fragment, then `stop`
    Text(Vec<String>),
    /// One function call whose arguments arrive in these fragments, then
    /// `tool_calls`
    ToolCall {
        name: String,
        fragments: Vec<String>,
    },
    /// Some text, then an in-band `{"error": ...}` payload
    InBandError { before: String, message: String },
    /// Text chunks with a truncated, unparseable record after the first
    Garbled(Vec<String>),
    /// Refuse the request outright with this status
    Refuse(StatusCode),
}

impl Scenario {
    /// Plain text reply
    pub fn text(fragments: &[&str]) -> Self {
        Self::Text(fragments.iter().map(|f| (*f).to_owned()).collect())
    }

    /// `submitProjectRequirements` call split into fragments
    pub fn tool_call(fragments: &[&str]) -> Self {
        Self::ToolCall {
            name: "submitProjectRequirements".to_owned(),
            fragments: fragments.iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    /// Text whose second record is cut off mid-JSON
    pub fn garbled(fragments: &[&str]) -> Self {
        Self::Garbled(fragments.iter().map(|f| (*f).to_owned()).collect())
    }

    /// Stream interrupted by an in-band error
    pub fn in_band_error(before: &str, message: &str) -> Self {
        Self::InBandError {
            before: before.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

/// Mock completion backend running on a random port
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    scenario: Scenario,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockLlm {
    /// Start the mock, replaying `scenario` for every request
    pub async fn start(scenario: Scenario) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            scenario,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for `llm.base_url`
    ///
    /// Includes `/v1` since the provider appends `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Every request received, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Stream chunk types --

#[derive(Debug, Serialize)]
struct StreamChunk {
    id: &'static str,
    object: &'static str,
    created: u64,
    model: String,
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Serialize)]
struct StreamChoice {
    index: u32,
    delta: StreamDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<&'static str>,
}

#[derive(Debug, Default, Serialize)]
struct StreamDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<StreamToolCall>>,
}

#[derive(Debug, Serialize)]
struct StreamToolCall {
    index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    tool_type: Option<&'static str>,
    function: StreamFunctionCall,
}

#[derive(Debug, Serialize)]
struct StreamFunctionCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    arguments: String,
}

/// Accumulates `data:` records for one response body
struct SseBody {
    model: String,
    body: String,
}

impl SseBody {
    fn new(model: String) -> Self {
        Self {
            model,
            body: String::new(),
        }
    }

    fn chunk(&mut self, delta: StreamDelta, finish_reason: Option<&'static str>) {
        let chunk = StreamChunk {
            id: "chatcmpl-mock",
            object: "chat.completion.chunk",
            created: 1_700_000_000,
            model: self.model.clone(),
            choices: vec![StreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        };
        self.raw(&serde_json::to_string(&chunk).unwrap());
    }

    fn raw(&mut self, data: &str) {
        self.body.push_str("data: ");
        self.body.push_str(data);
        self.body.push_str("\n\n");
    }

    fn into_response(self) -> Response {
        (StatusCode::OK, [(header::CONTENT_TYPE, "text/event-stream")], self.body).into_response()
    }
}

// -- Handlers --

async fn handle_chat_completions(
    State(state): State<Arc<MockLlmState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or("mock-model").to_owned();

    state.requests.lock().unwrap().push(RecordedRequest {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned),
        body,
    });

    let mut sse = SseBody::new(model);

    match &state.scenario {
        Scenario::Refuse(status) => {
            return (
                *status,
                Json(serde_json::json!({
                    "error": {
                        "message": "mock upstream refused the request",
                        "type": "server_error"
                    }
                })),
            )
                .into_response();
        }
        Scenario::Text(fragments) => {
            sse.chunk(
                StreamDelta {
                    role: Some("assistant"),
                    content: Some(String::new()),
                    ..StreamDelta::default()
                },
                None,
            );
            for fragment in fragments {
                sse.chunk(
                    StreamDelta {
                        content: Some(fragment.clone()),
                        ..StreamDelta::default()
                    },
                    None,
                );
            }
            sse.chunk(StreamDelta::default(), Some("stop"));
        }
        Scenario::ToolCall { name, fragments } => {
            sse.chunk(
                StreamDelta {
                    role: Some("assistant"),
                    tool_calls: Some(vec![StreamToolCall {
                        index: 0,
                        id: Some("call_mock"),
                        tool_type: Some("function"),
                        function: StreamFunctionCall {
                            name: Some(name.clone()),
                            arguments: String::new(),
                        },
                    }]),
                    ..StreamDelta::default()
                },
                None,
            );
            for fragment in fragments {
                sse.chunk(
                    StreamDelta {
                        tool_calls: Some(vec![StreamToolCall {
                            index: 0,
                            id: None,
                            tool_type: None,
                            function: StreamFunctionCall {
                                name: None,
                                arguments: fragment.clone(),
                            },
                        }]),
                        ..StreamDelta::default()
                    },
                    None,
                );
            }
            sse.chunk(StreamDelta::default(), Some("tool_calls"));
        }
        Scenario::Garbled(fragments) => {
            for (i, fragment) in fragments.iter().enumerate() {
                if i == 1 {
                    sse.raw(r#"{"choices":[{"index":0,"delta":{"content":"lo "#);
                }
                sse.chunk(
                    StreamDelta {
                        content: Some(fragment.clone()),
                        ..StreamDelta::default()
                    },
                    None,
                );
            }
            sse.chunk(StreamDelta::default(), Some("stop"));
        }
        Scenario::InBandError { before, message } => {
            sse.chunk(
                StreamDelta {
                    content: Some(before.clone()),
                    ..StreamDelta::default()
                },
                None,
            );
            sse.raw(
                &serde_json::json!({
                    "error": {"message": message, "type": "server_error"}
                })
                .to_string(),
            );
            // Anything after the error must never reach the browser
            sse.chunk(
                StreamDelta {
                    content: Some("unreachable".to_owned()),
                    ..StreamDelta::default()
                },
                None,
            );
        }
    }

    sse.raw("[DONE]");
    sse.into_response()
}
