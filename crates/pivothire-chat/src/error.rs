use http::StatusCode;
use pivothire_core::HttpError;
use thiserror::Error;

/// Errors that can occur while relaying a chat turn
#[derive(Debug, Error)]
pub enum ChatError {
    /// No upstream credential is configured
    #[error("Server configuration error: Missing API key.")]
    MissingCredential,

    /// Request body failed validation
    #[error("{0}")]
    InvalidRequest(String),

    /// A signed-in user is required
    #[error("Unauthorized")]
    Unauthorized,

    /// Upstream refused the request before streaming began
    #[error("AI service error: {0}")]
    Upstream(String),

    /// Upstream failed after streaming began
    #[error("AI service stream interrupted: {0}")]
    Streaming(String),

    /// Accumulated function-call arguments could not be parsed
    #[error("Failed to parse AI function call.")]
    ToolArguments(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HttpError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::MissingCredential | Self::Streaming(_) | Self::ToolArguments(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::MissingCredential => "configuration_error",
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Unauthorized => "authentication_error",
            Self::Upstream(_) => "upstream_error",
            Self::Streaming(_) => "streaming_error",
            Self::ToolArguments(_) => "tool_call_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "An internal server error occurred while processing your message.".to_owned(),
            other => other.to_string(),
        }
    }
}
