use pivothire_chat::types::RequirementsError;

use crate::session::SessionError;

/// Client-specific result type
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from the chat client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("{status} {error_type}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error type identifier
        error_type: String,
        /// Human-readable error message
        message: String,
    },

    /// Failed to parse a response or stream record
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Stream ended or broke before the turn finished
    #[error("stream error: {0}")]
    Stream(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Project brief rejected before sending
    #[error("invalid project: {0}")]
    Validation(#[from] RequirementsError),

    /// The dialog cannot start a turn right now
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Text suitable for the dialog's error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(_) => "Could not connect to the AI.".to_owned(),
            other => other.to_string(),
        }
    }
}
