//! Loaded classifier artifacts
//!
//! A `ModelHandle` only exists once an artifact has been read, verified and
//! deserialized, so holding one is proof that inference can run.

use crate::error::ModelError;
use crate::predictor::{Classifier, ModelFormat, OnnxClassifier, SoftmaxClassifier};
use crate::schema::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Metadata describing a loaded artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub version: String,
    pub format: ModelFormat,
    pub checksum: String,
    pub size_bytes: usize,
    pub path: PathBuf,
    pub schema_version: String,
    pub loaded_at: i64,
}

/// Immutable handle to a deserialized classifier
pub struct ModelHandle {
    classifier: Box<dyn Classifier>,
    info: ModelInfo,
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle").field("info", &self.info).finish()
    }
}

impl ModelHandle {
    /// Deserialize artifact bytes; the format is taken from `path`'s extension
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self, ModelError> {
        let format = ModelFormat::from_path(path).ok_or_else(|| ModelError::UnsupportedFormat {
            path: path.display().to_string(),
        })?;
        let checksum = compute_checksum(bytes);

        let classifier: Box<dyn Classifier> = match format {
            ModelFormat::Onnx => {
                let version = format!("onnx-{}", &checksum[..12]);
                Box::new(OnnxClassifier::from_bytes(bytes, version).map_err(|e| at_path(e, path))?)
            }
            ModelFormat::Json => {
                Box::new(SoftmaxClassifier::from_json(bytes).map_err(|e| at_path(e, path))?)
            }
        };

        let info = ModelInfo {
            version: classifier.version().to_string(),
            format,
            checksum,
            size_bytes: bytes.len(),
            path: path.to_path_buf(),
            schema_version: SCHEMA_VERSION.to_string(),
            loaded_at: chrono::Utc::now().timestamp(),
        };

        info!(
            version = %info.version,
            format = ?info.format,
            path = %path.display(),
            size = info.size_bytes,
            "Model artifact loaded"
        );

        Ok(Self { classifier, info })
    }

    /// Wrap an already-constructed classifier
    pub fn in_memory(classifier: Box<dyn Classifier>) -> Self {
        let info = ModelInfo {
            version: classifier.version().to_string(),
            format: classifier.format(),
            checksum: String::new(),
            size_bytes: 0,
            path: PathBuf::from("<memory>"),
            schema_version: SCHEMA_VERSION.to_string(),
            loaded_at: chrono::Utc::now().timestamp(),
        };
        Self { classifier, info }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }
}

/// Attach the artifact path to a load error raised by a backend
fn at_path(err: ModelError, path: &Path) -> ModelError {
    match err {
        ModelError::Load { reason, .. } => ModelError::Load {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    }
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
