use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Extension, Json,
};
use service_core::middleware::RequestId;
use std::time::Instant;
use validator::Validate;

use crate::error::RecommendationError;
use crate::models::{RecommendationRequest, RecommendationResponse};
use crate::services::metrics::{self, Outcome};
use crate::services::ModelError;
use crate::startup::AppState;

pub const LIVENESS_MESSAGE: &str = "Recommendation Service is running";

/// Liveness probe. Ignores the request entirely.
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

#[tracing::instrument(
    skip_all,
    fields(request_id = %request_id.as_ref().map_or("-", |Extension(id)| id.0.as_str()))
)]
pub async fn recommend(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RecommendationResponse>, RecommendationError> {
    let result = match body {
        Ok(body) => handle(&state, &body).await,
        Err(rejection) => Err(RecommendationError::Upstream(rejection.body_text())),
    };

    match &result {
        Ok(_) => metrics::record_request(Outcome::Success),
        Err(RecommendationError::Validation) => {
            tracing::info!("Rejected recommendation request without query");
            metrics::record_request(Outcome::Rejected);
        }
        Err(RecommendationError::Upstream(message)) => {
            tracing::warn!(error = %message, "Recommendation request failed");
            metrics::record_request(Outcome::Failed);
        }
    }

    result.map(|recommendation| Json(RecommendationResponse { recommendation }))
}

async fn handle(state: &AppState, body: &[u8]) -> Result<String, RecommendationError> {
    let request = parse_body(body)?;
    request.validate()?;

    Ok(invoke(state, &request.query).await?)
}

/// Parse the raw body. Anything other than a JSON object is a parse failure;
/// a missing query is left for validation.
pub fn parse_body(body: &[u8]) -> Result<RecommendationRequest, RecommendationError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(RecommendationError::Upstream(
            "Request body must be a JSON object".to_string(),
        ));
    }

    Ok(serde_json::from_value(value)?)
}

async fn invoke(state: &AppState, query: &str) -> Result<String, ModelError> {
    let provider = state.model_client.name();
    let started = Instant::now();

    let invocation = state.model_client.invoke(query);
    let result = match state.invocation_timeout {
        Some(limit) => tokio::time::timeout(limit, invocation)
            .await
            .unwrap_or_else(|_| Err(ModelError::Timeout(limit))),
        None => invocation.await,
    };

    metrics::record_invocation_latency(provider, started.elapsed().as_secs_f64());

    match &result {
        Ok(text) => tracing::debug!(provider, response_len = text.len(), "Model invocation succeeded"),
        Err(e) => {
            metrics::record_invocation_error(provider, e.kind());
            tracing::error!(provider, error = %e, "Model invocation failed");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockModelClient;
    use axum::{
        body::Body,
        extract::DefaultBodyLimit,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn parses_query_from_object() {
        let request = parse_body(br#"{"query":"recommend a book"}"#).unwrap();
        assert_eq!(request.query, "recommend a book");
    }

    #[test]
    fn empty_body_is_a_parse_failure() {
        assert!(matches!(
            parse_body(b""),
            Err(RecommendationError::Upstream(_))
        ));
    }

    #[test]
    fn non_object_json_is_a_parse_failure() {
        for body in [&b"null"[..], b"[]", b"\"query\"", b"42"] {
            let err = parse_body(body).unwrap_err();
            assert_eq!(err.to_string(), "Request body must be a JSON object");
        }
    }

    #[test]
    fn empty_object_parses_to_empty_query() {
        let request = parse_body(b"{}").unwrap();
        assert!(request.query.is_empty());
        assert!(request.validate().is_err());
    }

    #[tokio::test]
    async fn unreadable_body_is_reported_as_json() {
        let client = Arc::new(MockModelClient::responding("Dune"));
        let app = Router::new()
            .route("/", post(recommend))
            .layer(DefaultBodyLimit::max(16))
            .with_state(AppState::new(client.clone()));

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"query":"a rather long query"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("length limit exceeded"));
        assert!(client.calls().is_empty());
    }
}
