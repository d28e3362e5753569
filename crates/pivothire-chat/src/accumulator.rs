//! Assembly of function calls fragmented across stream deltas

use std::collections::BTreeMap;

use crate::error::ChatError;
use crate::types::{FinishReason, StreamEvent, ToolCallFragment, UpstreamDelta};

/// Index of the call treated as authoritative for a turn
const AUTHORITATIVE_INDEX: u32 = 0;

/// Function call whose arguments are still arriving
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingToolCall {
    /// Call identifier, once seen
    pub id: Option<String>,
    /// Function name, once seen
    pub name: Option<String>,
    /// Argument text in arrival order
    pub arguments: String,
}

impl PendingToolCall {
    fn absorb(&mut self, fragment: ToolCallFragment) {
        if self.id.is_none() {
            self.id = fragment.id;
        }
        if self.name.is_none() {
            self.name = fragment.name;
        }
        if let Some(arguments) = fragment.arguments {
            self.arguments.push_str(&arguments);
        }
    }

    fn into_event(self) -> Result<StreamEvent, ChatError> {
        let name = self
            .name
            .ok_or_else(|| ChatError::ToolArguments("function call carried no name".to_owned()))?;

        let arguments = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&self.arguments)
            .map_err(|e| ChatError::ToolArguments(e.to_string()))?;

        Ok(StreamEvent::ToolCall {
            name,
            arguments: serde_json::Value::Object(arguments),
        })
    }
}

/// Per-turn accumulator turning upstream deltas into relay events
///
/// Text is forwarded immediately. Function-call fragments are buffered per
/// upstream index and only parsed once the upstream reports
/// [`FinishReason::ToolCalls`].
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    pending: BTreeMap<u32, PendingToolCall>,
}

impl ToolCallAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one upstream delta, returning the events it produces
    pub fn push(&mut self, delta: UpstreamDelta) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(text) = delta.content
            && !text.is_empty()
        {
            events.push(StreamEvent::Text { value: text });
        }

        for fragment in delta.tool_calls {
            self.pending.entry(fragment.index).or_default().absorb(fragment);
        }

        if delta.finish_reason == Some(FinishReason::ToolCalls) {
            events.push(self.complete());
        }

        events
    }

    /// Close the function-call phase
    ///
    /// Parses the call at index 0 and clears every pending entry, so a turn
    /// yields at most one `tool_call` event.
    pub fn complete(&mut self) -> StreamEvent {
        let mut pending = std::mem::take(&mut self.pending);
        let authoritative = pending.remove(&AUTHORITATIVE_INDEX);

        if !pending.is_empty() {
            tracing::warn!(
                discarded = pending.len(),
                "upstream produced more than one function call; only the first is used"
            );
        }

        let result = authoritative
            .ok_or_else(|| ChatError::ToolArguments("no function call at index 0".to_owned()))
            .and_then(PendingToolCall::into_event);

        match result {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = ?e, "discarding malformed function call");
                StreamEvent::error(e.to_string())
            }
        }
    }

    /// Number of calls still buffered
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Buffered call for an index
    pub fn get(&self, index: u32) -> Option<&PendingToolCall> {
        self.pending.get(&index)
    }
}
