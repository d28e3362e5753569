//! Configuration model for the PivotHire chat service
//!
//! Loaded from a TOML file whose `{{ env.VAR }}` placeholders are expanded
//! from the process environment before parsing.

#![allow(clippy::must_use_candidate)]

pub mod chat;
pub mod cors;
mod env;
pub mod health;
pub mod identity;
pub mod llm;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use chat::*;
pub use cors::*;
pub use health::*;
pub use identity::*;
pub use llm::*;
pub use server::*;
pub use telemetry::*;

/// Top-level PivotHire configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream chat-completion API configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chat relay behaviour
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging and trace export
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
