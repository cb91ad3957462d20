//! Observability for the survey service
//!
//! Provides:
//! - Prometheus metrics (inference latency, prediction and error counts, model info)
//! - Structured JSON logging with tracing
//!
//! Survey answers are never logged; only outcomes and model metadata are.

use crate::models::ProbabilityDistribution;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for inference latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Histogram buckets for model load time (in seconds)
const LOAD_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 120.0];

static GLOBAL_METRICS: OnceLock<SurveyMetricsInner> = OnceLock::new();

struct SurveyMetricsInner {
    prediction_latency_seconds: Histogram,
    model_load_seconds: Histogram,
    predictions_total: IntCounterVec,
    prediction_errors: IntCounter,
    validation_failures: IntCounterVec,
    model_version_info: GaugeVec,
}

impl SurveyMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "survey_prediction_latency_seconds",
                "Time spent encoding and scoring one survey response",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            model_load_seconds: register_histogram!(
                "survey_model_load_seconds",
                "Time spent fetching and deserializing the model artifact",
                LOAD_BUCKETS.to_vec()
            )
            .expect("Failed to register model_load_seconds"),

            predictions_total: register_int_counter_vec!(
                "survey_predictions_total",
                "Predictions served, by most likely class",
                &["class"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors: register_int_counter!(
                "survey_prediction_errors_total",
                "Inference failures"
            )
            .expect("Failed to register prediction_errors"),

            validation_failures: register_int_counter_vec!(
                "survey_validation_failures_total",
                "Rejected survey fields, by field name",
                &["field"]
            )
            .expect("Failed to register validation_failures"),

            model_version_info: register_gauge_vec!(
                "survey_model_version_info",
                "Information about the currently loaded model artifact",
                &["version", "format", "schema"]
            )
            .expect("Failed to register model_version_info"),
        }
    }
}

/// Handle to the process-wide survey metrics
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct SurveyMetrics {
    _private: (),
}

impl Default for SurveyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SurveyMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SurveyMetricsInner {
        GLOBAL_METRICS.get_or_init(SurveyMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn observe_model_load(&self, duration_secs: f64) {
        self.inner().model_load_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, most_likely_class: &str) {
        self.inner()
            .predictions_total
            .with_label_values(&[most_likely_class])
            .inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    pub fn inc_validation_failure(&self, field: &str) {
        self.inner()
            .validation_failures
            .with_label_values(&[field])
            .inc();
    }

    pub fn set_model_version(&self, version: &str, format: &str, schema: &str) {
        self.inner().model_version_info.reset();
        self.inner()
            .model_version_info
            .with_label_values(&[version, format, schema])
            .set(1.0);
    }
}

/// Event-tagged logging for service lifecycle and predictions
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            service_version = %version,
            "Survey service started"
        );
    }

    pub fn log_model_loaded(&self, model_version: &str, path: &str, elapsed_ms: u128) {
        info!(
            event = "model_loaded",
            service = %self.service,
            model_version = %model_version,
            path = %path,
            elapsed_ms = elapsed_ms,
            "Model artifact ready for inference"
        );
    }

    pub fn log_model_load_failed(&self, path: &str, reason: &str) {
        error!(
            event = "model_load_failed",
            service = %self.service,
            path = %path,
            reason = %reason,
            "Model artifact unavailable, refusing to serve predictions"
        );
    }

    pub fn log_prediction(&self, distribution: &ProbabilityDistribution, model_version: &str) {
        let (class, probability) = distribution.most_likely();
        info!(
            event = "prediction_generated",
            service = %self.service,
            no_diabetes = distribution.no_diabetes,
            prediabetes = distribution.prediabetes,
            diabetes = distribution.diabetes,
            most_likely = %class,
            most_likely_probability = probability,
            model_version = %model_version,
            "Generated survey prediction"
        );
    }

    pub fn log_validation_failure(&self, fields: &[&str]) {
        warn!(
            event = "validation_failed",
            service = %self.service,
            fields = ?fields,
            "Rejected survey response"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Survey service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_registry() {
        let metrics = SurveyMetrics::new();
        let clone = metrics.clone();

        metrics.observe_prediction_latency(0.0004);
        metrics.observe_model_load(0.2);
        metrics.inc_predictions("Prediabetes");
        clone.inc_predictions("Prediabetes");
        metrics.inc_prediction_errors();
        metrics.inc_validation_failure("Age");
        metrics.set_model_version("lr-1", "json", "v1");

        let count = metrics
            .inner()
            .predictions_total
            .with_label_values(&["Prediabetes"])
            .get();
        assert!(count >= 2);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("survey-server");
        assert_eq!(logger.service, "survey-server");
    }
}
