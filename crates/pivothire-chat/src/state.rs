use std::sync::Arc;

use pivothire_config::{ChatConfig, LlmConfig};
use pivothire_core::RequestContext;
use tracing::Instrument;

use crate::error::ChatError;
use crate::prompt::{DEFAULT_SYSTEM_PROMPT, bound_history, build_system_prompt};
use crate::provider::CompletionProvider;
use crate::provider::openai::OpenAiProvider;
use crate::relay::{EventStream, relay_events};
use crate::types::{
    ChatRequest, CompletionRequest, ConversationMessage, ToolChoice, submit_project_requirements_tool,
};

/// Shared state for chat route handlers
#[derive(Clone)]
pub struct ChatState {
    inner: Arc<ChatStateInner>,
}

struct ChatStateInner {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
    model: String,
    temperature: f64,
    max_completion_tokens: Option<u32>,
    max_history: usize,
    require_user: bool,
}

impl ChatState {
    /// Build state from configuration with the `OpenAI` provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be constructed
    pub fn from_config(llm: &LlmConfig, chat: &ChatConfig) -> Result<Self, ChatError> {
        let provider = OpenAiProvider::new(llm)?;

        if llm.credential().is_none() {
            tracing::error!("no LLM API key configured; chat turns will be refused");
        }

        Ok(Self::with_provider(Arc::new(provider), llm, chat))
    }

    /// Build state around an explicit provider
    pub fn with_provider(provider: Arc<dyn CompletionProvider>, llm: &LlmConfig, chat: &ChatConfig) -> Self {
        let base = chat.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);

        Self {
            inner: Arc::new(ChatStateInner {
                provider,
                system_prompt: build_system_prompt(base, &chat.skills),
                model: llm.model.clone(),
                temperature: llm.temperature,
                max_completion_tokens: llm.max_completion_tokens,
                max_history: chat.max_history,
                require_user: chat.require_user,
            }),
        }
    }

    /// System prompt sent ahead of every turn
    pub fn system_prompt(&self) -> &str {
        &self.inner.system_prompt
    }

    /// Assemble the upstream request for a client history
    pub fn completion_request(&self, messages: &[ConversationMessage]) -> CompletionRequest {
        let mut upstream_messages = vec![ConversationMessage::system(self.inner.system_prompt.clone())];
        upstream_messages.extend(bound_history(messages, self.inner.max_history));

        CompletionRequest {
            model: self.inner.model.clone(),
            messages: upstream_messages,
            temperature: self.inner.temperature,
            max_completion_tokens: self.inner.max_completion_tokens,
            tools: vec![submit_project_requirements_tool()],
            tool_choice: ToolChoice::Auto,
        }
    }

    /// Whether the upstream API key is configured
    pub fn has_credential(&self) -> bool {
        self.inner.provider.has_credential()
    }

    /// Open one chat turn
    ///
    /// Checks run in a fixed order: API key, then user, then history. A
    /// missing key wins over every client mistake. Every check happens before
    /// the upstream is contacted; once this returns `Ok`, failures are
    /// reported inside the event stream.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` without an API key, `Unauthorized` when a
    /// user is required but absent, `InvalidRequest` for an empty history,
    /// and `Upstream` when the provider refuses the request.
    pub async fn open_turn(&self, request: ChatRequest, context: &RequestContext) -> Result<EventStream, ChatError> {
        if !self.has_credential() {
            tracing::error!(request_id = %context.request_id, "refusing chat turn: missing API key");
            return Err(ChatError::MissingCredential);
        }

        if self.inner.require_user && context.user.is_none() {
            return Err(ChatError::Unauthorized);
        }

        if request.messages.is_empty() {
            return Err(ChatError::InvalidRequest(
                "Messages are required and must be a non-empty array.".to_owned(),
            ));
        }

        let completion = self.completion_request(&request.messages);

        let span = tracing::info_span!(
            "chat_turn",
            request_id = %context.request_id,
            user = context.user.as_ref().map(|u| u.user_id.as_str()),
            provider = self.inner.provider.name(),
            messages = completion.messages.len() - 1,
        );

        let upstream = self
            .inner
            .provider
            .stream_completion(&completion, context)
            .instrument(span.clone())
            .await?;

        Ok(relay_events(upstream, span))
    }
}
