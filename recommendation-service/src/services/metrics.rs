//! Prometheus metrics for recommendation-service.
//!
//! Recording functions are no-ops until [`init_metrics`] has run.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use service_core::error::AppError;
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static RECOMMENDATION_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static MODEL_INVOCATION_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static MODEL_INVOCATION_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Outcome label of a handled recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Rejected => "rejected",
            Outcome::Failed => "failed",
        }
    }
}

/// Initialize all metrics. Calling it again keeps the first registry.
pub fn init_metrics() -> Result<(), AppError> {
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new(
            "recommendation_requests_total",
            "Total recommendation requests by outcome",
        ),
        &["outcome"],
    )
    .map_err(metric_error)?;

    let invocation_latency = HistogramVec::new(
        HistogramOpts::new(
            "model_invocation_latency_seconds",
            "Model invocation latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider"],
    )
    .map_err(metric_error)?;

    let invocation_errors = IntCounterVec::new(
        Opts::new(
            "model_invocation_errors_total",
            "Total failed model invocations",
        ),
        &["provider", "error_type"],
    )
    .map_err(metric_error)?;

    registry
        .register(Box::new(requests_total.clone()))
        .map_err(metric_error)?;
    registry
        .register(Box::new(invocation_latency.clone()))
        .map_err(metric_error)?;
    registry
        .register(Box::new(invocation_errors.clone()))
        .map_err(metric_error)?;

    if REGISTRY.set(registry).is_err() {
        // Another caller initialized first.
        return Ok(());
    }
    let _ = RECOMMENDATION_REQUESTS_TOTAL.set(requests_total);
    let _ = MODEL_INVOCATION_LATENCY_SECONDS.set(invocation_latency);
    let _ = MODEL_INVOCATION_ERRORS_TOTAL.set(invocation_errors);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> Result<String, AppError> {
    let registry = REGISTRY
        .get()
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Metrics registry not initialized")))?;

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(metric_error)?;

    String::from_utf8(buffer).map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
}

/// Record a handled recommendation request.
pub fn record_request(outcome: Outcome) {
    if let Some(counter) = RECOMMENDATION_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome.as_str()]).inc();
    }
}

/// Record model invocation latency.
pub fn record_invocation_latency(provider: &str, duration_secs: f64) {
    if let Some(histogram) = MODEL_INVOCATION_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider])
            .observe(duration_secs);
    }
}

/// Record a failed model invocation.
pub fn record_invocation_error(provider: &str, error_type: &str) {
    if let Some(counter) = MODEL_INVOCATION_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}

fn metric_error(err: prometheus::Error) -> AppError {
    AppError::InternalError(anyhow::Error::new(err))
}
