//! Conversion between internal types and `OpenAI` wire format

use crate::protocol::openai::{
    OpenAiFunction, OpenAiMessage, OpenAiRequest, OpenAiStreamChoice, OpenAiStreamChunk, OpenAiTool,
};
use crate::types::{CompletionRequest, FinishReason, ToolCallFragment, UpstreamDelta};

// -- Outbound: internal request -> OpenAI wire request --

impl From<&CompletionRequest> for OpenAiRequest {
    fn from(req: &CompletionRequest) -> Self {
        let tools: Vec<OpenAiTool> = req
            .tools
            .iter()
            .map(|tool| OpenAiTool {
                tool_type: "function".to_owned(),
                function: OpenAiFunction {
                    name: tool.name.clone(),
                    description: Some(tool.description.clone()),
                    parameters: Some(tool.parameters.clone()),
                },
            })
            .collect();

        let has_tools = !tools.is_empty();

        Self {
            model: req.model.clone(),
            messages: req
                .messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role.as_str().to_owned(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: Some(req.temperature),
            max_completion_tokens: req.max_completion_tokens,
            stream: Some(true),
            tools: has_tools.then_some(tools),
            tool_choice: has_tools.then(|| req.tool_choice.as_str().to_owned()),
        }
    }
}

// -- Stream conversion --

/// Convert a streaming chunk into internal deltas
///
/// Only the first choice is relayed; chat turns never request `n > 1`.
pub fn openai_chunk_to_deltas(chunk: &OpenAiStreamChunk) -> Vec<UpstreamDelta> {
    chunk
        .choices
        .iter()
        .filter(|choice| choice.index == 0)
        .map(openai_stream_choice_to_delta)
        .collect()
}

fn openai_stream_choice_to_delta(choice: &OpenAiStreamChoice) -> UpstreamDelta {
    let content = choice.delta.content.clone().or_else(|| choice.delta.refusal.clone());

    let tool_calls = choice
        .delta
        .tool_calls
        .iter()
        .flatten()
        .map(|tc| ToolCallFragment {
            index: tc.index,
            id: tc.id.clone(),
            name: tc.function.as_ref().and_then(|f| f.name.clone()),
            arguments: tc.function.as_ref().and_then(|f| f.arguments.clone()),
        })
        .collect();

    UpstreamDelta {
        content,
        tool_calls,
        finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
    }
}

/// Parse a finish reason string
fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}
