use pivothire_chat::types::SUBMIT_PROJECT_REQUIREMENTS;
use pivothire_chat::{ConversationMessage, ProjectRequirements, Role, StreamEvent};
use thiserror::Error;
use uuid::Uuid;

/// Assistant message every dialog opens with
pub const GREETING: &str = "Hello! I'm PivotHire AI. How can I help you define your project needs today?";

/// Message shown when a function call cannot be turned into a project brief
const UNUSABLE_CALL: &str = "Failed to parse AI function call.";

/// What the dialog is doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user; input enabled
    Idle,
    /// A turn is in flight; input disabled
    Streaming,
    /// The assistant proposed a project brief; input disabled until the
    /// user confirms or rejects it
    Review(ProjectRequirements),
}

/// Kind of transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Part of the dialogue sent back to the relay
    Chat,
    /// Locally generated failure notice
    Error,
}

/// One rendered transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiMessage {
    /// Stable identity used to update streaming text in place
    pub id: Uuid,
    /// Author
    pub role: Role,
    /// Text shown to the user
    pub text: String,
    /// Whether this is dialogue or a local notice
    pub kind: MessageKind,
}

impl UiMessage {
    fn new(role: Role, text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            kind,
        }
    }
}

/// Reason a turn cannot start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Nothing to send
    #[error("message is empty")]
    EmptyMessage,
    /// A turn is in flight or a brief awaits confirmation
    #[error("the assistant is busy")]
    Busy,
}

/// UI-free model of the chat dialog
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<UiMessage>,
    state: SessionState,
    streaming_reply: Option<Uuid>,
    error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Open a dialog seeded with the assistant greeting
    pub fn new() -> Self {
        Self {
            messages: vec![UiMessage::new(Role::Assistant, GREETING, MessageKind::Chat)],
            state: SessionState::Idle,
            streaming_reply: None,
            error: None,
        }
    }

    /// Transcript in display order
    pub fn messages(&self) -> &[UiMessage] {
        &self.messages
    }

    /// Current state
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Dismissible error banner, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the input box accepts a new message
    pub const fn can_send(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    /// Brief awaiting confirmation
    pub const fn pending_project(&self) -> Option<&ProjectRequirements> {
        match &self.state {
            SessionState::Review(requirements) => Some(requirements),
            SessionState::Idle | SessionState::Streaming => None,
        }
    }

    /// Start a turn with the user's text
    ///
    /// Appends the user message and returns the dialogue history to send:
    /// user and assistant messages only, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `EmptyMessage` for blank input and `Busy` unless idle
    pub fn begin_turn(&mut self, text: &str) -> Result<Vec<ConversationMessage>, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if !self.can_send() {
            return Err(SessionError::Busy);
        }

        self.messages.push(UiMessage::new(Role::User, text, MessageKind::Chat));
        self.state = SessionState::Streaming;
        self.streaming_reply = None;
        self.error = None;

        Ok(self.history())
    }

    /// Apply one relayed event; returns `true` once the turn is over
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        match event {
            StreamEvent::Text { value } => {
                self.append_reply(&value);
                false
            }
            StreamEvent::ToolCall { name, arguments } => {
                self.propose(&name, &arguments);
                false
            }
            StreamEvent::Error { value } => {
                self.error = Some(value);
                false
            }
            StreamEvent::Done => {
                self.streaming_reply = None;
                if self.state == SessionState::Streaming {
                    self.state = SessionState::Idle;
                }
                true
            }
        }
    }

    /// End the in-flight turn with a local failure notice
    ///
    /// Input is re-enabled unless a brief is already awaiting review.
    pub fn fail_turn(&mut self, message: &str) {
        self.messages
            .push(UiMessage::new(Role::System, format!("Error: {message}"), MessageKind::Error));
        self.error = Some(message.to_owned());
        self.streaming_reply = None;
        if self.state == SessionState::Streaming {
            self.state = SessionState::Idle;
        }
    }

    /// Hide the error banner
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Accept the proposed brief, leaving review
    ///
    /// The caller publishes the returned brief; nothing is submitted
    /// automatically.
    pub fn confirm(&mut self) -> Option<ProjectRequirements> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Review(requirements) => Some(requirements),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Discard the proposed brief so the user can keep refining it
    pub fn reject(&mut self) -> bool {
        if matches!(self.state, SessionState::Review(_)) {
            self.state = SessionState::Idle;
            true
        } else {
            false
        }
    }

    fn history(&self) -> Vec<ConversationMessage> {
        self.messages
            .iter()
            .filter(|m| m.kind == MessageKind::Chat && m.role != Role::System)
            .map(|m| ConversationMessage {
                role: m.role,
                content: m.text.clone(),
            })
            .collect()
    }

    fn append_reply(&mut self, fragment: &str) {
        let existing = self
            .streaming_reply
            .and_then(|id| self.messages.iter_mut().find(|m| m.id == id));

        if let Some(message) = existing {
            message.text.push_str(fragment);
            return;
        }

        let message = UiMessage::new(Role::Assistant, fragment, MessageKind::Chat);
        self.streaming_reply = Some(message.id);
        self.messages.push(message);
    }

    fn propose(&mut self, name: &str, arguments: &serde_json::Value) {
        if name != SUBMIT_PROJECT_REQUIREMENTS {
            tracing::warn!(function = %name, "ignoring call to unknown function");
            self.error = Some(UNUSABLE_CALL.to_owned());
            return;
        }

        match ProjectRequirements::from_arguments(arguments) {
            Ok(requirements) => self.state = SessionState::Review(requirements),
            Err(e) => {
                tracing::warn!(error = %e, "function call arguments do not describe a project");
                self.error = Some(UNUSABLE_CALL.to_owned());
            }
        }
    }
}
