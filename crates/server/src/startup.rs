//! Model loading at server startup

use anyhow::{Context, Result};
use std::time::Instant;
use survey_lib::{
    health::{components, HealthRegistry},
    observability::{StructuredLogger, SurveyMetrics},
    provider::ModelProvider,
    ModelHandle,
};

use crate::config::ServerConfig;

/// Fetch and load the configured artifact, reporting the outcome through the
/// model provider's health, the load metrics and the structured log.
///
/// Readiness is only granted once this returns a handle.
pub async fn load_model(
    config: &ServerConfig,
    health_registry: &HealthRegistry,
    metrics: &SurveyMetrics,
    logger: &StructuredLogger,
) -> Result<ModelHandle> {
    let start = Instant::now();
    let loaded = match ModelProvider::new(config.provider_config()) {
        Ok(provider) => provider.ensure_available().await,
        Err(e) => Err(e),
    };

    let model = match loaded {
        Ok(handle) => handle,
        Err(e) => {
            logger.log_model_load_failed(&config.model_path.display().to_string(), &e.to_string());
            health_registry
                .set_unhealthy(components::MODEL_PROVIDER, e.to_string())
                .await;
            return Err(e).context("Model artifact could not be loaded");
        }
    };
    let elapsed = start.elapsed();
    metrics.observe_model_load(elapsed.as_secs_f64());

    let info = model.info();
    metrics.set_model_version(
        &info.version,
        &format!("{:?}", info.format).to_lowercase(),
        &info.schema_version,
    );
    logger.log_model_loaded(
        &info.version,
        &info.path.display().to_string(),
        elapsed.as_millis(),
    );

    health_registry.set_healthy(components::MODEL_PROVIDER).await;
    health_registry.set_model_loaded(true).await;

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_lib::health::ComponentStatus;
    use survey_lib::predictor::SoftmaxArtifact;
    use survey_lib::schema::{FeatureSchema, CLASS_LABELS, NUM_CLASSES, NUM_FEATURES};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_model_marks_provider_unhealthy() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            model_path: dir.path().join("absent.json"),
            ..ServerConfig::default()
        };
        let health = HealthRegistry::new();
        health.register(components::MODEL_PROVIDER).await;

        let result = load_model(
            &config,
            &health,
            &SurveyMetrics::new(),
            &StructuredLogger::new("test"),
        )
        .await;
        assert!(result.is_err());

        let report = health.health().await;
        assert_eq!(
            report.components[components::MODEL_PROVIDER].status,
            ComponentStatus::Unhealthy
        );
        assert!(!health.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_loaded_model_marks_provider_healthy_and_ready() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.json");
        let artifact = SoftmaxArtifact {
            version: "lr-startup".to_string(),
            feature_order: FeatureSchema::feature_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            classes: CLASS_LABELS.iter().map(|s| s.to_string()).collect(),
            coefficients: vec![vec![0.0; NUM_FEATURES]; NUM_CLASSES],
            intercepts: vec![0.0; NUM_CLASSES],
        };
        std::fs::write(&model_path, serde_json::to_vec(&artifact).unwrap()).unwrap();

        let config = ServerConfig {
            model_path,
            ..ServerConfig::default()
        };
        let health = HealthRegistry::new();
        health
            .set_degraded(components::MODEL_PROVIDER, "starting")
            .await;

        let model = load_model(
            &config,
            &health,
            &SurveyMetrics::new(),
            &StructuredLogger::new("test"),
        )
        .await
        .unwrap();
        assert_eq!(model.version(), "lr-startup");

        let report = health.health().await;
        assert_eq!(
            report.components[components::MODEL_PROVIDER].status,
            ComponentStatus::Healthy
        );
        assert!(health.readiness().await.ready);
    }
}
