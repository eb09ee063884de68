//! Outcome taxonomy of the recommendation endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::recommendation::QUERY_REQUIRED;
use crate::models::ErrorResponse;
use crate::services::ModelError;

/// Every failure the handler can produce. `Validation` maps to 400, anything
/// else is `Upstream` and maps to 500 with its message passed through.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("{}", QUERY_REQUIRED)]
    Validation,

    #[error("{0}")]
    Upstream(String),
}

impl RecommendationError {
    pub fn status(&self) -> StatusCode {
        match self {
            RecommendationError::Validation => StatusCode::BAD_REQUEST,
            RecommendationError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for RecommendationError {
    fn from(_: validator::ValidationErrors) -> Self {
        RecommendationError::Validation
    }
}

impl From<serde_json::Error> for RecommendationError {
    fn from(err: serde_json::Error) -> Self {
        RecommendationError::Upstream(err.to_string())
    }
}

impl From<ModelError> for RecommendationError {
    fn from(err: ModelError) -> Self {
        RecommendationError::Upstream(err.to_string())
    }
}

impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
