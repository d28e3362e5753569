//! Chat relay for the PivotHire requirements assistant
//!
//! Forwards a bounded dialogue history to a streaming chat-completion API and
//! re-emits the reply as a closed set of [`StreamEvent`]s. Function-call
//! fragments are assembled by the [`ToolCallAccumulator`] so the browser only
//! ever sees complete, parsed `submitProjectRequirements` calls.
//!
//! The `http` feature adds the axum route; without it the crate only exposes
//! the shared wire types, which is what the client uses.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod accumulator;
pub mod convert;
pub mod error;
#[cfg(feature = "http")]
pub mod handler;
pub mod prompt;
pub mod protocol;
pub mod provider;
pub mod relay;
pub mod state;
pub mod types;

pub use accumulator::{PendingToolCall, ToolCallAccumulator};
pub use error::ChatError;
#[cfg(feature = "http")]
pub use handler::chat_router;
pub use provider::{CompletionProvider, UpstreamStream};
pub use relay::{EventStream, relay_events};
pub use state::ChatState;
pub use types::{ChatRequest, ConversationMessage, ProjectRequirements, Role, StreamEvent};
