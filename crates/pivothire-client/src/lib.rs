//! Client for the PivotHire chat relay
//!
//! [`ChatClient`] opens turns and reads the relayed SSE stream;
//! [`ChatSession`] is the UI-free model of the chat dialog that those events
//! drive. [`run_turn`] ties the two together for one user message.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
pub mod error;
mod session;
mod turn;

pub use client::{ChatClient, CreatedProject, EventStream, ProjectCreated, ProjectId};
pub use error::{ClientError, Result};
pub use pivothire_chat::{ConversationMessage, ProjectRequirements, Role, StreamEvent};
pub use session::{ChatSession, GREETING, MessageKind, SessionError, SessionState, UiMessage};
pub use turn::{TurnOutcome, run_turn};
