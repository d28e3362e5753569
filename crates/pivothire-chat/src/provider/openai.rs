//! OpenAI-compatible streaming provider

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{StreamExt, future, stream};
use pivothire_config::LlmConfig;
use pivothire_core::RequestContext;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{CompletionProvider, UpstreamStream};
use crate::convert::openai::openai_chunk_to_deltas;
use crate::error::ChatError;
use crate::protocol::openai::{OpenAiErrorResponse, OpenAiRequest, OpenAiStreamPayload};
use crate::types::{CompletionRequest, UpstreamDelta};

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// End-of-stream sentinel sent as the last `data:` payload
const DONE_SENTINEL: &str = "[DONE]";

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

/// What one SSE record contributes to the delta stream
enum Record {
    Deltas(Vec<Result<UpstreamDelta, ChatError>>),
    Finished,
}

impl OpenAiProvider {
    /// Create from LLM configuration
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Internal` if the default base URL cannot be parsed
    pub fn new(config: &LlmConfig) -> Result<Self, ChatError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| ChatError::Internal(e.into()))?,
        };

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: config.credential().cloned(),
        })
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

/// Interpret one SSE `data:` payload
fn parse_record(data: &str) -> Record {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return Record::Finished;
    }
    // Records without data carry nothing to relay
    if data.is_empty() {
        return Record::Deltas(Vec::new());
    }

    match serde_json::from_str::<OpenAiStreamPayload>(data) {
        Ok(OpenAiStreamPayload::Chunk(chunk)) => {
            Record::Deltas(openai_chunk_to_deltas(&chunk).into_iter().map(Ok).collect())
        }
        Ok(OpenAiStreamPayload::Error(body)) => {
            tracing::warn!(message = %body.error.message, "upstream reported an error mid-stream");
            Record::Deltas(vec![Err(ChatError::Streaming(body.error.message))])
        }
        Err(e) => {
            tracing::warn!(error = %e, data = %data, "unparseable upstream chunk");
            Record::Deltas(vec![Err(ChatError::Streaming(format!("malformed upstream chunk: {e}")))])
        }
    }
}

/// Extract a readable message from an upstream error body
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(|_| body.trim().to_owned(), |e| e.error.message)
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn stream_completion(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<UpstreamStream, ChatError> {
        let api_key = self.api_key.as_ref().ok_or(ChatError::MissingCredential)?;
        let wire_request = OpenAiRequest::from(request);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key.expose_secret())
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(request_id = %context.request_id, error = %e, "upstream stream request failed");
                ChatError::Upstream(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(request_id = %context.request_id, status = %status, "upstream returned error");
            return Err(ChatError::Upstream(format!(
                "provider returned {status}: {}",
                upstream_error_message(&body)
            )));
        }

        let records = response
            .bytes_stream()
            .eventsource()
            .map(|result| match result {
                Ok(event) => parse_record(&event.data),
                Err(e) => Record::Deltas(vec![Err(ChatError::Streaming(e.to_string()))]),
            })
            .take_while(|record| future::ready(!matches!(record, Record::Finished)))
            .flat_map(|record| match record {
                Record::Deltas(deltas) => stream::iter(deltas),
                Record::Finished => stream::iter(Vec::new()),
            });

        Ok(Box::pin(records))
    }
}
