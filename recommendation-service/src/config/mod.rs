use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Model the original deployment invokes when nothing else is configured.
const DEFAULT_MODEL_ID: &str = "anthropic.claude-v2";
const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    pub common: core_config::Config,
    pub model: ModelConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    /// Bedrock model identifier (e.g., anthropic.claude-v2)
    pub model_id: String,
    pub region: String,
    pub max_tokens: Option<i32>,
    pub temperature: Option<f32>,
    /// Upper bound on a single invocation. `None` leaves the call unbounded.
    pub invocation_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Bedrock,
    Mock,
}

impl RecommendationConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(RecommendationConfig {
            common: common_config,
            model: ModelConfig {
                provider: get_env("MODEL_PROVIDER", Some("bedrock"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                model_id: get_env("BEDROCK_MODEL_ID", Some(DEFAULT_MODEL_ID), is_prod)?,
                region: get_env("AWS_REGION", Some(DEFAULT_REGION), is_prod)?,
                max_tokens: get_optional_env("MODEL_MAX_TOKENS")?,
                temperature: get_optional_env("MODEL_TEMPERATURE")?,
                invocation_timeout_secs: get_optional_env("MODEL_INVOCATION_TIMEOUT_SECS")?,
            },
            observability: ObservabilityConfig {
                log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            },
        })
    }
}

impl ModelConfig {
    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_secs.map(Duration::from_secs)
    }
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Bedrock => "bedrock",
            ModelProvider::Mock => "mock",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bedrock" => Ok(ModelProvider::Bedrock),
            "mock" => Ok(ModelProvider::Mock),
            _ => Err(format!("Invalid model provider: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Read an optional variable. Unset or empty means `None`; a value that does
/// not parse is a configuration error rather than a silent fallback.
fn get_optional_env<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => parse_value(key, &val).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}
