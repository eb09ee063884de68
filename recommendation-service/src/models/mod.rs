//! Request and response payloads of the recommendation endpoint.

pub mod recommendation;

pub use recommendation::{ErrorResponse, RecommendationRequest, RecommendationResponse};
