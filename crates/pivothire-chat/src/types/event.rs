use serde::{Deserialize, Serialize};

/// Event relayed to the browser, one per SSE record
///
/// Serialized flat with a `type` tag, e.g. `{"type":"text","value":"Hel"}`.
/// Every relayed stream ends with exactly one [`StreamEvent::Done`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Assistant text fragment, forwarded as soon as it arrives
    Text {
        /// The fragment
        value: String,
    },
    /// Completed function call with parsed arguments
    ToolCall {
        /// Function name
        name: String,
        /// Parsed argument object
        arguments: serde_json::Value,
    },
    /// The turn failed; the session stays usable
    Error {
        /// User-facing message
        value: String,
    },
    /// End of the turn
    Done,
}

impl StreamEvent {
    /// Text fragment event
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { value: value.into() }
    }

    /// Error event
    pub fn error(value: impl Into<String>) -> Self {
        Self::Error { value: value.into() }
    }

    /// Whether this is the terminal event
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}
