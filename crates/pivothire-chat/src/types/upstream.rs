/// One normalised increment of a streaming completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamDelta {
    /// Assistant text fragment
    pub content: Option<String>,
    /// Function-call fragments carried by this increment
    pub tool_calls: Vec<ToolCallFragment>,
    /// Why generation stopped, on the last increment
    pub finish_reason: Option<FinishReason>,
}

impl UpstreamDelta {
    /// Delta carrying only text
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Delta carrying one function-call fragment
    pub fn tool_fragment(fragment: ToolCallFragment) -> Self {
        Self {
            tool_calls: vec![fragment],
            ..Self::default()
        }
    }

    /// Delta carrying only a finish reason
    pub fn finished(reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(reason),
            ..Self::default()
        }
    }
}

/// Piece of a function call, keyed by the upstream-supplied index
///
/// `id` and `name` normally arrive on the first fragment only; `arguments`
/// is an arbitrary slice of the serialized argument document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallFragment {
    /// Position of the call within the turn
    pub index: u32,
    /// Call identifier
    pub id: Option<String>,
    /// Function name
    pub name: Option<String>,
    /// Argument text slice
    pub arguments: Option<String>,
}

impl ToolCallFragment {
    /// Opening fragment carrying id and name
    pub fn start(index: u32, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index,
            id: Some(id.into()),
            name: Some(name.into()),
            arguments: None,
        }
    }

    /// Continuation fragment carrying argument text
    pub fn arguments(index: u32, arguments: impl Into<String>) -> Self {
        Self {
            index,
            arguments: Some(arguments.into()),
            ..Self::default()
        }
    }
}

/// Reason generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural end of text
    Stop,
    /// Token cap reached
    Length,
    /// The function-call phase is complete
    ToolCalls,
    /// Output withheld by the provider
    ContentFilter,
}
