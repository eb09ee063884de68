//! Mock model client for local development and tests.

use super::{ModelClient, ModelError};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

enum Behavior {
    Echo,
    Respond(String),
    Fail(String),
}

/// In-process stand-in for a remote model. Records every prompt it receives.
pub struct MockModelClient {
    behavior: Behavior,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockModelClient {
    /// Answers every prompt with `Mock recommendation for: <prompt>`.
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Answers every prompt with `response`.
    pub fn responding(response: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Respond(response.into()))
    }

    /// Fails every invocation with a service error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Echo => Ok(format!("Mock recommendation for: {}", prompt)),
            Behavior::Respond(response) => Ok(response.clone()),
            Behavior::Fail(message) => Err(ModelError::Service(message.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
