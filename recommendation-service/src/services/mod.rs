pub mod metrics;
pub mod providers;

pub use providers::{BedrockModelClient, MockModelClient, ModelClient, ModelError};
