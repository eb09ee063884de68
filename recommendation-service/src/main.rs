use recommendation_service::config::RecommendationConfig;
use recommendation_service::services::metrics::init_metrics;
use recommendation_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = RecommendationConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "recommendation-service",
        &config.observability.log_level,
        config.observability.otlp_endpoint.as_deref(),
    )?;

    init_metrics()?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        e
    })?;

    app.run_until_stopped().await
}
