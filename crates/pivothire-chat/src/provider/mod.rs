//! Streaming completion backends

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use pivothire_core::RequestContext;

use crate::error::ChatError;
use crate::types::{CompletionRequest, UpstreamDelta};

/// Normalised upstream delta stream
///
/// Dropping it abandons the upstream request.
pub type UpstreamStream = Pin<Box<dyn Stream<Item = Result<UpstreamDelta, ChatError>> + Send>>;

/// Trait implemented by each completion backend
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Whether a credential is available to call the backend
    fn has_credential(&self) -> bool;

    /// Open a streaming completion
    ///
    /// Fails with [`ChatError::Upstream`] when the backend cannot be reached
    /// or refuses the request; errors after that arrive as stream items.
    async fn stream_completion(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<UpstreamStream, ChatError>;
}
