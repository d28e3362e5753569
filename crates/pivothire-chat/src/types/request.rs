use serde::{Deserialize, Serialize};

use super::message::ConversationMessage;

/// Fully assembled upstream completion request
///
/// Built once per turn: system prompt first, then the bounded history.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Messages in upstream order
    pub messages: Vec<ConversationMessage>,
    /// Sampling temperature
    pub temperature: f64,
    /// Output token cap
    pub max_completion_tokens: Option<u32>,
    /// Functions the model may call
    pub tools: Vec<ToolDefinition>,
    /// How the model picks a function
    pub tool_choice: ToolChoice,
}

/// Function declaration offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name
    pub name: String,
    /// What the function is for
    pub description: String,
    /// JSON Schema of the arguments
    pub parameters: serde_json::Value,
}

/// Function selection mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// Never call a function
    None,
    /// Model decides
    #[default]
    Auto,
    /// Must call a function
    Required,
}

impl ToolChoice {
    /// Wire value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Auto => "auto",
            Self::Required => "required",
        }
    }
}
