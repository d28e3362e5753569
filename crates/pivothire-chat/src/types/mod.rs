//! Provider-agnostic types for chat turns
//!
//! Everything the browser sends or receives lives here, together with the
//! normalised upstream deltas the accumulator consumes.

pub mod event;
pub mod message;
pub mod request;
pub mod requirements;
pub mod upstream;

pub use event::StreamEvent;
pub use message::{ChatRequest, ConversationMessage, Role};
pub use request::{CompletionRequest, ToolChoice, ToolDefinition};
pub use requirements::{ProjectRequirements, RequirementsError, SUBMIT_PROJECT_REQUIREMENTS, submit_project_requirements_tool};
pub use upstream::{FinishReason, ToolCallFragment, UpstreamDelta};
