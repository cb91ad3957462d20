//! HTTP API for survey prediction, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use survey_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    observability::{StructuredLogger, SurveyMetrics},
    predictor::{self, ClassProbability, OutputFormatter},
    schema::FeatureSchema,
    FeatureVector, ModelHandle, ProbabilityDistribution, SurveyError, SurveyResponse,
    ValidationError,
};
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: SurveyMetrics,
    pub logger: StructuredLogger,
    pub model: Arc<ModelHandle>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: SurveyMetrics,
        logger: StructuredLogger,
        model: Arc<ModelHandle>,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            logger,
            model,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub probabilities: ProbabilityDistribution,
    pub most_likely: String,
    pub classes: Vec<ClassProbability>,
    pub display: Vec<String>,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub features: FeatureVector,
    pub feature_order: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Error responses produced by the survey handlers
pub enum ApiError {
    BadPayload(JsonRejection),
    Invalid(Vec<ValidationError>),
    Inference(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadPayload(rejection) => (
                rejection.status(),
                ErrorResponse {
                    error: "Malformed survey payload".to_string(),
                    details: vec![rejection.body_text()],
                },
            ),
            ApiError::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: "Survey response failed validation".to_string(),
                    details: errors.iter().map(|e| e.to_string()).collect(),
                },
            ),
            ApiError::Inference(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Prediction failed".to_string(),
                    details: vec![message],
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Validate the whole response, recording every rejected field
fn validated(
    state: &AppState,
    payload: Result<Json<SurveyResponse>, JsonRejection>,
) -> Result<SurveyResponse, ApiError> {
    let Json(response) = payload.map_err(ApiError::BadPayload)?;
    let errors = predictor::validate(&response);
    if !errors.is_empty() {
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        for field in &fields {
            state.metrics.inc_validation_failure(field);
        }
        state.logger.log_validation_failure(&fields);
        return Err(ApiError::Invalid(errors));
    }
    Ok(response)
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SurveyResponse>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let response = validated(&state, payload)?;
    let start = Instant::now();

    let distribution = match predictor::encode_and_predict(&response, &state.model) {
        Ok(d) => d,
        Err(SurveyError::Validation(e)) => return Err(ApiError::Invalid(vec![e])),
        Err(SurveyError::Inference(e)) => {
            error!(error = %e, "Inference failed");
            state.metrics.inc_prediction_errors();
            state
                .health_registry
                .set_degraded(components::PREDICTOR, e.to_string())
                .await;
            return Err(ApiError::Inference(e.to_string()));
        }
    };

    state
        .metrics
        .observe_prediction_latency(start.elapsed().as_secs_f64());
    let (most_likely, _) = distribution.most_likely();
    state.metrics.inc_predictions(most_likely);
    state
        .logger
        .log_prediction(&distribution, state.model.version());
    state.health_registry.set_healthy(components::PREDICTOR).await;

    let formatter = OutputFormatter::new();
    Ok(Json(PredictResponse {
        probabilities: distribution,
        most_likely: most_likely.to_string(),
        classes: formatter.classes(&distribution),
        display: formatter.lines(&distribution),
        model_version: state.model.version().to_string(),
    }))
}

async fn encode(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SurveyResponse>, JsonRejection>,
) -> Result<Json<EncodeResponse>, ApiError> {
    let response = validated(&state, payload)?;
    let features = predictor::encode(&response).map_err(|e| ApiError::Invalid(vec![e]))?;
    Ok(Json(EncodeResponse {
        features,
        feature_order: FeatureSchema::feature_names()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }))
}

async fn schema() -> impl IntoResponse {
    Json(FeatureSchema::current())
}

async fn model_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.model.info().clone())
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once the model is loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/encode", post(encode))
        .route("/api/v1/schema", get(schema))
        .route("/api/v1/model", get(model_info))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
