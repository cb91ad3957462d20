//! Survey Server - diabetes risk prediction from questionnaire answers
//!
//! Loads the classifier artifact once at startup and serves predictions
//! over HTTP. A missing or unloadable model is fatal.

use anyhow::Result;
use std::sync::Arc;
use survey_lib::{
    health::{components, HealthRegistry},
    observability::{StructuredLogger, SurveyMetrics},
};
use survey_server::{api, config, startup};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_NAME: &str = "survey-server";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = config::ServerConfig::load()?;
    info!(
        port = config.api_port,
        model_path = %config.model_path.display(),
        model_url = ?config.model_url,
        "Server configured"
    );

    let logger = StructuredLogger::new(SERVICE_NAME);
    logger.log_startup(SERVER_VERSION);

    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL_PROVIDER).await;
    health_registry.register(components::PREDICTOR).await;

    let metrics = SurveyMetrics::new();

    // The handle is built once here and shared read-only for the process lifetime
    let model = startup::load_model(&config, &health_registry, &metrics, &logger).await?;

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        logger.clone(),
        Arc::new(model),
    ));

    api::serve(config.api_port, app_state, shutdown_signal(logger)).await?;
    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal(logger: StructuredLogger) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    logger.log_shutdown("SIGINT received");
}
