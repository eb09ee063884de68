//! End-to-end tests over a real TCP listener.
//!
//! The application is built with the mock model provider, so these tests do
//! not need AWS credentials.

use recommendation_service::config::{
    ModelConfig, ModelProvider, ObservabilityConfig, RecommendationConfig,
};
use recommendation_service::services::MockModelClient;
use recommendation_service::startup::Application;
use reqwest::{Client, StatusCode};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;

fn test_config(provider: ModelProvider) -> RecommendationConfig {
    RecommendationConfig {
        // Random port for testing
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        model: ModelConfig {
            provider,
            model_id: "anthropic.claude-v2".to_string(),
            region: "us-east-1".to_string(),
            max_tokens: None,
            temperature: None,
            invocation_timeout_secs: Some(5),
        },
        observability: ObservabilityConfig {
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
    }
}

/// Spawn the application and return its base address.
async fn spawn(app: Application) -> String {
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    // Wait for server to be ready by polling the liveness probe
    let client = Client::new();
    let health_url = format!("{}/api/recommendation", address);
    for _ in 0..50 {
        if client.get(&health_url).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    address
}

#[tokio::test]
async fn liveness_probe_over_tcp() {
    let app = Application::build(test_config(ModelProvider::Mock))
        .await
        .expect("Failed to build application");
    let address = spawn(app).await;

    let response = Client::new()
        .get(format!("{}/api/recommendation/", address))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        "Recommendation Service is running"
    );
}

#[tokio::test]
async fn mock_provider_answers_recommendations() {
    let app = Application::build(test_config(ModelProvider::Mock))
        .await
        .expect("Failed to build application");
    let address = spawn(app).await;

    let response = Client::new()
        .post(format!("{}/api/recommendation", address))
        .json(&serde_json::json!({ "query": "a space opera" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body["recommendation"],
        "Mock recommendation for: a space opera"
    );
}

#[tokio::test]
async fn injected_client_failure_is_reported() {
    let client = Arc::new(MockModelClient::failing("AccessDeniedException: not authorized"));
    let app = Application::build_with_client(test_config(ModelProvider::Mock), client.clone())
        .await
        .expect("Failed to build application");
    let address = spawn(app).await;

    let response = Client::new()
        .post(format!("{}/api/recommendation/", address))
        .json(&serde_json::json!({ "query": "recommend a book" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "AccessDeniedException: not authorized");
    assert_eq!(client.calls(), vec!["recommend a book"]);
}
