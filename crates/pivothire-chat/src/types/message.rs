use serde::{Deserialize, Serialize};

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the assistant
    System,
    /// The business representative
    User,
    /// The assistant
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry of the dialogue history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ConversationMessage {
    /// Message from the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Message from the assistant
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// System instruction
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Body of a chat turn request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Dialogue history, oldest first
    pub messages: Vec<ConversationMessage>,
}
