//! AWS Bedrock model client.
//!
//! Sends a single user turn through the Bedrock Runtime `Converse` API and
//! returns the text of the assistant's reply. Credentials are resolved by the
//! default AWS provider chain when the client is built.

use super::{ModelClient, ModelError};
use crate::config::ModelConfig;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ConverseOutput, InferenceConfiguration, Message,
};
use aws_sdk_bedrockruntime::Client;

/// Bedrock text model client.
pub struct BedrockModelClient {
    client: Client,
    model_id: String,
    inference: Option<InferenceConfiguration>,
}

impl BedrockModelClient {
    /// Resolve AWS configuration for the configured region and build a client.
    pub async fn from_config(config: &ModelConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        Self::new(Client::new(&sdk_config), config)
    }

    pub fn new(client: Client, config: &ModelConfig) -> Self {
        let inference = if config.max_tokens.is_some() || config.temperature.is_some() {
            Some(
                InferenceConfiguration::builder()
                    .set_max_tokens(config.max_tokens)
                    .set_temperature(config.temperature)
                    .build(),
            )
        } else {
            None
        };

        Self {
            client,
            model_id: config.model_id.clone(),
            inference,
        }
    }
}

#[async_trait]
impl ModelClient for BedrockModelClient {
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| ModelError::InvalidRequest(e.to_string()))?;

        tracing::debug!(
            model = %self.model_id,
            prompt_len = prompt.len(),
            "Sending request to Bedrock"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .messages(message)
            .set_inference_config(self.inference.clone())
            .send()
            .await
            .map_err(service_error)?;

        extract_text(response.output())
    }

    fn name(&self) -> &'static str {
        "bedrock"
    }
}

/// Concatenate the text blocks of the assistant message.
fn extract_text(output: Option<&ConverseOutput>) -> Result<String, ModelError> {
    let Some(ConverseOutput::Message(message)) = output else {
        return Err(ModelError::EmptyResponse);
    };

    let text: Vec<&str> = message
        .content()
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();

    if text.is_empty() {
        Err(ModelError::EmptyResponse)
    } else {
        Ok(text.concat())
    }
}

/// Render an SDK failure as `<code>: <message>` when the service sent both,
/// falling back to the SDK's full error chain (dispatch, timeout, credentials).
fn service_error<E, R>(err: SdkError<E, R>) -> ModelError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (None, Some(message)) => message.to_string(),
        _ => DisplayErrorContext(&err).to_string(),
    };
    ModelError::Service(message)
}
