use std::pin::Pin;

use bytes::Bytes;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use pivothire_chat::{ChatRequest, ConversationMessage, ProjectRequirements, StreamEvent};
use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, Result};

/// Default route of the chat relay
const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// Route of the project-creation endpoint
const PROJECTS_PATH: &str = "/api/projects";

/// Default header carrying the signed-in user id
const DEFAULT_IDENTITY_HEADER: &str = "x-pivothire-user";

/// SSE record delimiter
const RECORD_DELIMITER: &[u8] = b"\n\n";

/// Events of one relayed turn
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// HTTP client for the chat relay and project creation
#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: Url,
    http: reqwest::Client,
    chat_path: String,
    identity_header: String,
    user: Option<String>,
}

/// Response of the project-creation endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCreated {
    /// Confirmation text
    pub message: String,
    /// The stored project
    pub project: CreatedProject,
}

/// Stored project as echoed back on creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedProject {
    /// Database id
    pub id: ProjectId,
    /// Project title
    pub project_name: String,
    /// Creation timestamp
    pub created_at: String,
}

/// Project id, numeric or textual depending on the store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    /// Integer key
    Number(i64),
    /// UUID or other text key
    Text(String),
}

impl ChatClient {
    /// Create a new client pointing at the given base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::Config(format!("invalid base URL: {e}")))?;

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            chat_path: DEFAULT_CHAT_PATH.to_owned(),
            identity_header: DEFAULT_IDENTITY_HEADER.to_owned(),
            user: None,
        })
    }

    /// Identify requests as coming from this user
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user = Some(user_id.into());
        self
    }

    /// Override the header used to send the user id
    #[must_use]
    pub fn with_identity_header(mut self, header: impl Into<String>) -> Self {
        self.identity_header = header.into();
        self
    }

    /// Override the chat relay route
    #[must_use]
    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    /// Get the base URL
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Open one chat turn
    ///
    /// Returns the relayed events as they arrive; the stream yields a
    /// `Parse` error for a record it cannot decode and keeps going.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the relay answers non-2xx
    pub async fn open_turn(&self, messages: &[ConversationMessage]) -> Result<EventStream> {
        let url = make_url(&self.base_url, &self.chat_path);
        let body = ChatRequest {
            messages: messages.to_vec(),
        };

        let response = self.request(reqwest::Method::POST, &url).json(&body).send().await?;
        let response = handle_error(response).await?;

        Ok(Box::pin(parse_sse_stream(response.bytes_stream())))
    }

    /// Publish a confirmed project brief
    ///
    /// # Errors
    ///
    /// Returns `Validation` without contacting the server when the brief is
    /// incomplete, otherwise any transport or API error
    pub async fn create_project(&self, requirements: &ProjectRequirements) -> Result<ProjectCreated> {
        requirements.validate()?;

        let url = make_url(&self.base_url, PROJECTS_PATH);
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(requirements)
            .send()
            .await?;

        handle_error(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("failed to parse project response: {e}")))
    }

    /// Build a request carrying the identity header
    fn request(&self, method: reqwest::Method, url: &Url) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, url.as_str());

        if let Some(user) = &self.user {
            builder = builder.header(self.identity_header.as_str(), user.as_str());
        }

        builder
    }
}

/// Build a full URL from base and path
fn make_url(base_url: &Url, path: &str) -> Url {
    let mut url = base_url.clone();
    url.set_path(path);
    url
}

/// Check an HTTP response for errors
async fn handle_error(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (error_type, message) = parse_error_body(&body, status);

    Err(ClientError::Api {
        status: status.as_u16(),
        error_type,
        message,
    })
}

/// Parse an error body into (type, message)
///
/// Accepts both `{"error": "..."}` and `{"error": {"message", "type"}}`.
fn parse_error_body(body: &str, status: reqwest::StatusCode) -> (String, String) {
    let fallback = || format!("API request failed with status {}", status.as_u16());

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        let message = if body.trim().is_empty() { fallback() } else { body.to_owned() };
        return ("unknown".to_owned(), message);
    };

    match &json["error"] {
        serde_json::Value::String(message) => ("unknown".to_owned(), message.clone()),
        error => {
            let error_type = error["type"].as_str().unwrap_or("unknown").to_owned();
            let message = error["message"].as_str().map_or_else(fallback, ToOwned::to_owned);
            (error_type, message)
        }
    }
}

/// Parse a byte stream of SSE records into events
///
/// Bytes are buffered until a full record has arrived, so multi-byte
/// characters split across chunks decode correctly.
fn parse_sse_stream<S>(byte_stream: S) -> impl Stream<Item = Result<StreamEvent>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static,
{
    byte_stream
        .scan(Vec::new(), |buffer: &mut Vec<u8>, result| {
            let events = match result {
                Ok(bytes) => {
                    buffer.extend_from_slice(&bytes);
                    drain_records(buffer)
                }
                Err(e) => vec![Err(ClientError::Http(e))],
            };
            future::ready(Some(events))
        })
        .flat_map(stream::iter)
}

/// Remove every complete record from the buffer and decode it
fn drain_records(buffer: &mut Vec<u8>) -> Vec<Result<StreamEvent>> {
    let mut events = Vec::new();

    while let Some(pos) = buffer.windows(RECORD_DELIMITER.len()).position(|w| w == RECORD_DELIMITER) {
        let record: Vec<u8> = buffer.drain(..pos + RECORD_DELIMITER.len()).collect();
        if let Some(event) = parse_record(&record[..pos]) {
            events.push(event);
        }
    }

    events
}

/// Decode one record; comment-only records yield nothing
fn parse_record(record: &[u8]) -> Option<Result<StreamEvent>> {
    let text = match std::str::from_utf8(record) {
        Ok(text) => text,
        Err(e) => return Some(Err(ClientError::Parse(format!("stream record is not UTF-8: {e}")))),
    };

    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();

    if data.is_empty() {
        return None;
    }

    let payload = data.join("\n");
    Some(
        serde_json::from_str::<StreamEvent>(&payload)
            .map_err(|e| ClientError::Parse(format!("failed to parse stream event: {e}"))),
    )
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn chunks(parts: Vec<Vec<u8>>) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> {
        stream::iter(parts.into_iter().map(|p| Ok(Bytes::from(p))))
    }

    async fn collect(parts: &[&str]) -> Vec<Result<StreamEvent>> {
        let parts = parts.iter().map(|p| p.as_bytes().to_vec()).collect();
        parse_sse_stream(chunks(parts)).collect().await
    }

    #[tokio::test]
    async fn records_split_across_chunks_are_joined() {
        let events = collect(&[
            "data: {\"type\":\"te",
            "xt\",\"value\":\"Hel\"}\n",
            "\ndata: {\"type\":\"done\"}\n\n",
        ])
        .await;

        let events: Vec<_> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(events, vec![StreamEvent::text("Hel"), StreamEvent::Done]);
    }

    #[tokio::test]
    async fn multibyte_text_split_mid_character() {
        let record = "data: {\"type\":\"text\",\"value\":\"caf\u{e9}\"}\n\n".as_bytes();
        let split = record.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let (head, tail) = record.split_at(split);

        let events: Vec<_> = parse_sse_stream(chunks(vec![head.to_vec(), tail.to_vec()])).collect().await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &StreamEvent::text("caf\u{e9}"));
    }

    #[tokio::test]
    async fn keep_alive_comments_are_ignored() {
        let events = collect(&[":\n\ndata: {\"type\":\"done\"}\n\n"]).await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &StreamEvent::Done);
    }

    #[tokio::test]
    async fn bad_record_is_reported_and_stream_continues() {
        let events = collect(&["data: {oops}\n\ndata: {\"type\":\"done\"}\n\n"]).await;

        assert!(matches!(events[0], Err(ClientError::Parse(_))));
        assert_eq!(events[1].as_ref().unwrap(), &StreamEvent::Done);
    }

    #[test]
    fn error_bodies_in_both_shapes() {
        let status = reqwest::StatusCode::BAD_REQUEST;

        assert_eq!(
            parse_error_body(r#"{"error":"Unauthorized"}"#, status),
            ("unknown".to_owned(), "Unauthorized".to_owned())
        );
        assert_eq!(
            parse_error_body(r#"{"error":{"message":"bad","type":"invalid_request_error"}}"#, status),
            ("invalid_request_error".to_owned(), "bad".to_owned())
        );
        assert_eq!(
            parse_error_body("", status),
            ("unknown".to_owned(), "API request failed with status 400".to_owned())
        );
    }

    #[tokio::test]
    async fn open_turn_posts_history_with_identity() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header("x-pivothire-user", "usr_9"))
            .and(body_json(serde_json::json!({
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "data: {\"type\":\"text\",\"value\":\"Hey\"}\n\ndata: {\"type\":\"done\"}\n\n",
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri()).unwrap().with_user("usr_9");
        let stream = client.open_turn(&[ConversationMessage::user("hi")]).await.unwrap();

        let events: Vec<_> = stream.map(Result::unwrap).collect().await;
        assert_eq!(events, vec![StreamEvent::text("Hey"), StreamEvent::Done]);
    }

    #[tokio::test]
    async fn open_turn_surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "Messages are required and must be a non-empty array.", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri()).unwrap();
        let Err(error) = client.open_turn(&[]).await else {
            panic!("expected an API error");
        };

        match error {
            ClientError::Api {
                status, error_type, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(error_type, "invalid_request_error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_project_posts_camel_case_brief() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/projects"))
            .and(body_json(serde_json::json!({
                "projectName": "Site",
                "projectDescription": "Storefront",
                "skillsRequired": [1]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "message": "Project published successfully!",
                "project": {"id": 12, "project_name": "Site", "created_at": "2025-06-01T10:00:00Z"}
            })))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri()).unwrap();
        let created = client
            .create_project(&ProjectRequirements {
                project_name: "Site".to_owned(),
                project_description: "Storefront".to_owned(),
                skills_required: vec![1],
                budget: None,
                timeline: None,
                notes: None,
            })
            .await
            .unwrap();

        assert_eq!(created.project.id, ProjectId::Number(12));
        assert_eq!(created.project.project_name, "Site");
    }

    #[tokio::test]
    async fn incomplete_brief_is_not_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri()).unwrap();
        let result = client
            .create_project(&ProjectRequirements {
                project_name: "Site".to_owned(),
                project_description: "Storefront".to_owned(),
                skills_required: Vec::new(),
                budget: None,
                timeline: None,
                notes: None,
            })
            .await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
    }
}
