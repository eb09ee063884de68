//! HTTP handlers for recommendation-service.

pub mod metrics;
pub mod recommendation;

pub use recommendation::{liveness, recommend};
