//! Survey encoding and ML prediction

mod features;
mod inference;
mod output;

pub use features::{encode, encode_field, validate};
pub use inference::{ModelFormat, OnnxClassifier, SoftmaxArtifact, SoftmaxClassifier};
pub use output::{format_distribution, ClassProbability, OutputFormatter, DISPLAY_DECIMALS};

use crate::error::{InferenceError, SurveyError};
use crate::models::{FeatureVector, ProbabilityDistribution, SurveyResponse};
use crate::provider::ModelHandle;
use std::time::Instant;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
pub const MAX_INFERENCE_MS: u128 = 50;

/// Probability capability of a loaded classifier artifact
pub trait Classifier: Send + Sync {
    /// Raw class scores for a single sample, in class order
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f32>, InferenceError>;

    /// Version recorded with the artifact
    fn version(&self) -> &str;

    fn format(&self) -> ModelFormat;
}

/// Run the classifier on one encoded sample
pub fn predict(
    vector: &FeatureVector,
    handle: &ModelHandle,
) -> Result<ProbabilityDistribution, InferenceError> {
    let start = Instant::now();

    let raw = handle.classifier().predict_proba(vector)?;
    let distribution = ProbabilityDistribution::from_model_output(&raw)?;

    let elapsed = start.elapsed();
    if elapsed.as_millis() > MAX_INFERENCE_MS {
        warn!(
            elapsed_ms = elapsed.as_millis(),
            "Inference exceeded {}ms target", MAX_INFERENCE_MS
        );
    } else {
        debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
    }

    Ok(distribution)
}

/// Validate, encode and score a survey response in one step
pub fn encode_and_predict(
    response: &SurveyResponse,
    handle: &ModelHandle,
) -> Result<ProbabilityDistribution, SurveyError> {
    let vector = encode(response)?;
    Ok(predict(&vector, handle)?)
}
