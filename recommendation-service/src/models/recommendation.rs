use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

pub const QUERY_REQUIRED: &str = "Query is required";

/// Body of `POST /api/recommendation`.
///
/// A missing query, or any falsy JSON value (`null`, `false`, zero, `[]`,
/// `{}`), deserializes to the empty string so that it is rejected by
/// validation instead of by the parser. Other non-string values are parse
/// errors. The value is not trimmed.
#[derive(Debug, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[serde(default, deserialize_with = "falsy_as_empty")]
    #[validate(length(min = 1, message = "Query is required"))]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn falsy_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(query) => Ok(query),
        Value::Null | Value::Bool(false) => Ok(String::new()),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(String::new()),
        Value::Array(items) if items.is_empty() => Ok(String::new()),
        Value::Object(fields) if fields.is_empty() => Ok(String::new()),
        Value::Bool(true) => Err(de::Error::invalid_type(Unexpected::Bool(true), &"a string")),
        Value::Number(n) => {
            let unexpected = if let Some(u) = n.as_u64() {
                Unexpected::Unsigned(u)
            } else if let Some(i) = n.as_i64() {
                Unexpected::Signed(i)
            } else {
                Unexpected::Float(n.as_f64().unwrap_or_default())
            };
            Err(de::Error::invalid_type(unexpected, &"a string"))
        }
        Value::Array(_) => Err(de::Error::invalid_type(Unexpected::Seq, &"a string")),
        Value::Object(_) => Err(de::Error::invalid_type(Unexpected::Map, &"a string")),
    }
}
