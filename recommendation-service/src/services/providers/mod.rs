//! Model invocation clients.
//!
//! The handler only sees the [`ModelClient`] trait, so the Bedrock client used
//! in production and the in-process mock are interchangeable behind an
//! `Arc<dyn ModelClient>`.

pub mod bedrock;
pub mod mock;

pub use bedrock::BedrockModelClient;
pub use mock::MockModelClient;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Error type for model invocations.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failure reported by the remote service. Displays the message as is.
    #[error("{0}")]
    Service(String),

    #[error("Model invocation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model returned no text content")]
    EmptyResponse,
}

impl ModelError {
    /// Short label used for the `error_type` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::InvalidRequest(_) => "invalid_request",
            ModelError::Service(_) => "service",
            ModelError::Timeout(_) => "timeout",
            ModelError::EmptyResponse => "empty_response",
        }
    }
}

/// Handle to a remote text-generation model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send `prompt` to the model and return its text output.
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError>;

    /// Provider label for logs and metrics.
    fn name(&self) -> &'static str;
}
