//! Application startup and lifecycle management.

use crate::config::{ModelConfig, ModelProvider, RecommendationConfig};
use crate::handlers;
use crate::services::{BedrockModelClient, MockModelClient, ModelClient};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const RECOMMENDATION_PATH: &str = "/api/recommendation";
pub const RECOMMENDATION_PATH_SLASH: &str = "/api/recommendation/";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub model_client: Arc<dyn ModelClient>,
    /// Bound applied to each model invocation. `None` waits indefinitely.
    pub invocation_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(model_client: Arc<dyn ModelClient>) -> Self {
        Self {
            model_client,
            invocation_timeout: None,
        }
    }

    pub fn with_invocation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.invocation_timeout = timeout;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            RECOMMENDATION_PATH,
            get(handlers::liveness).post(handlers::recommend),
        )
        .route(
            RECOMMENDATION_PATH_SLASH,
            get(handlers::liveness).post(handlers::recommend),
        )
        .route("/metrics", get(handlers::metrics::metrics))
        // Request bodies are not size-limited.
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Build the configured model client. Called once per process.
pub async fn build_model_client(config: &ModelConfig) -> Arc<dyn ModelClient> {
    match config.provider {
        ModelProvider::Bedrock => {
            let client = BedrockModelClient::from_config(config).await;
            tracing::info!(
                model = %config.model_id,
                region = %config.region,
                "Initialized Bedrock model client"
            );
            Arc::new(client)
        }
        ModelProvider::Mock => {
            tracing::warn!("Using mock model client");
            Arc::new(MockModelClient::new())
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RecommendationConfig) -> Result<Self, AppError> {
        let model_client = build_model_client(&config.model).await;
        Self::build_with_client(config, model_client).await
    }

    /// Build the application around an already constructed model client.
    pub async fn build_with_client(
        config: RecommendationConfig,
        model_client: Arc<dyn ModelClient>,
    ) -> Result<Self, AppError> {
        let timeout = config.model.invocation_timeout();
        match timeout {
            Some(limit) => tracing::info!(timeout_secs = limit.as_secs(), "Model invocations are bounded"),
            None => tracing::info!("Model invocations are unbounded"),
        }

        let state = AppState::new(model_client).with_invocation_timeout(timeout);

        // Port 0 = random port for testing
        let address = config.common.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Recommendation service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
