//! Classifier backends
//!
//! Two artifact formats are supported: ONNX graphs run through tract, and a
//! JSON multinomial logistic model whose weights are stored in plain text.
//! Both are validated against the feature schema when they are loaded.

use super::Classifier;
use crate::error::{InferenceError, ModelError};
use crate::models::FeatureVector;
use crate::schema::{FeatureSchema, NUM_CLASSES, NUM_FEATURES};
use serde::{Deserialize, Serialize};
use tract_onnx::prelude::*;
use tracing::debug;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Serialization format of a classifier artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Onnx,
    Json,
}

impl ModelFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("onnx") => Some(ModelFormat::Onnx),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(ModelFormat::Json),
            _ => None,
        }
    }
}

/// ONNX classifier run through tract
///
/// The graph must take a single `f32[1, 19]` input. The last graph output is
/// read as the class probabilities, which matches scikit-learn exports with
/// zipmap disabled (`output_label`, `output_probability`).
pub struct OnnxClassifier {
    model: TractModel,
    version: String,
}

impl OnnxClassifier {
    /// Parse, optimize and probe an ONNX model
    pub fn from_bytes(model_bytes: &[u8], version: impl Into<String>) -> Result<Self, ModelError> {
        let model = Self::load_model(model_bytes).map_err(|e| ModelError::Load {
            path: "<onnx>".to_string(),
            reason: format!("{:#}", e),
        })?;
        let classifier = Self {
            model,
            version: version.into(),
        };

        // Dry run so a graph with the wrong output arity never reaches a request
        let probe = classifier
            .predict_proba(&FeatureVector::new([0.0; NUM_FEATURES]))
            .map_err(|e| ModelError::SchemaMismatch(format!("probe inference failed: {}", e)))?;
        if probe.len() != NUM_CLASSES {
            return Err(ModelError::SchemaMismatch(format!(
                "model outputs {} values, expected {}",
                probe.len(),
                NUM_CLASSES
            )));
        }
        Ok(classifier)
    }

    fn load_model(model_bytes: &[u8]) -> TractResult<TractModel> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())?
            .into_optimized()?
            .into_runnable()
    }
}

impl Classifier for OnnxClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f32>, InferenceError> {
        let input = Tensor::from_shape(&[1, NUM_FEATURES], &features.values()[..])
            .map_err(|e| InferenceError::Execution(format!("{:#}", e)))?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Execution(format!("{:#}", e)))?;
        let probabilities = outputs
            .last()
            .ok_or_else(|| InferenceError::Execution("model produced no outputs".to_string()))?;
        let view = probabilities
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(format!("{:#}", e)))?;
        Ok(view.iter().copied().collect())
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn format(&self) -> ModelFormat {
        ModelFormat::Onnx
    }
}

/// On-disk layout of a softmax linear model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxArtifact {
    pub version: String,
    pub feature_order: Vec<String>,
    pub classes: Vec<String>,
    /// One row of feature weights per class
    pub coefficients: Vec<Vec<f32>>,
    pub intercepts: Vec<f32>,
}

/// Multinomial logistic regression: softmax(W x + b)
#[derive(Debug, Clone)]
pub struct SoftmaxClassifier {
    weights: [[f32; NUM_FEATURES]; NUM_CLASSES],
    intercepts: [f32; NUM_CLASSES],
    version: String,
}

impl SoftmaxClassifier {
    /// Build from a parsed artifact, checking it against the schema
    pub fn from_artifact(artifact: SoftmaxArtifact) -> Result<Self, ModelError> {
        FeatureSchema::check_feature_order(&artifact.feature_order)
            .map_err(ModelError::SchemaMismatch)?;
        FeatureSchema::check_classes(&artifact.classes).map_err(ModelError::SchemaMismatch)?;

        if artifact.coefficients.len() != NUM_CLASSES || artifact.intercepts.len() != NUM_CLASSES {
            return Err(ModelError::SchemaMismatch(format!(
                "expected {} coefficient rows and intercepts, got {} and {}",
                NUM_CLASSES,
                artifact.coefficients.len(),
                artifact.intercepts.len()
            )));
        }

        let mut weights = [[0.0f32; NUM_FEATURES]; NUM_CLASSES];
        for (class, row) in artifact.coefficients.iter().enumerate() {
            if row.len() != NUM_FEATURES {
                return Err(ModelError::SchemaMismatch(format!(
                    "coefficient row {} has {} weights, expected {}",
                    class,
                    row.len(),
                    NUM_FEATURES
                )));
            }
            if row.iter().any(|w| !w.is_finite()) {
                return Err(ModelError::SchemaMismatch(format!(
                    "coefficient row {} contains a non-finite weight",
                    class
                )));
            }
            weights[class].copy_from_slice(row);
        }

        if artifact.intercepts.iter().any(|b| !b.is_finite()) {
            return Err(ModelError::SchemaMismatch(
                "intercepts contain a non-finite value".to_string(),
            ));
        }
        let mut intercepts = [0.0f32; NUM_CLASSES];
        intercepts.copy_from_slice(&artifact.intercepts);

        debug!(version = %artifact.version, "Softmax model constructed");

        Ok(Self {
            weights,
            intercepts,
            version: artifact.version,
        })
    }

    /// Parse a JSON artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: SoftmaxArtifact =
            serde_json::from_slice(bytes).map_err(|e| ModelError::Load {
                path: "<json>".to_string(),
                reason: e.to_string(),
            })?;
        Self::from_artifact(artifact)
    }
}

impl Classifier for SoftmaxClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f32>, InferenceError> {
        let x = features.values();
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(self.intercepts.iter())
            .map(|(row, b)| {
                row.iter()
                    .zip(x.iter())
                    .map(|(w, v)| *w as f64 * *v as f64)
                    .sum::<f64>()
                    + *b as f64
            })
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(InferenceError::Execution(
                "softmax normalizer is not finite".to_string(),
            ));
        }
        Ok(exps.iter().map(|e| (e / total) as f32).collect())
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn format(&self) -> ModelFormat {
        ModelFormat::Json
    }
}
