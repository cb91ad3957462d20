//! Model download and local caching
//!
//! The artifact is fetched once if it is not already cached on disk, then
//! verified and deserialized. A partially written download never replaces
//! the cache path.

use super::artifact::{compute_checksum, ModelHandle};
use crate::error::ModelError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the model provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Remote location of the artifact, used only when the cache is empty
    pub model_url: Option<String>,
    /// Local cache path; its extension selects the artifact format
    pub model_path: PathBuf,
    /// Expected SHA256 of the artifact (hex)
    pub expected_sha256: Option<String>,
    /// Maximum artifact size in bytes
    pub max_model_bytes: usize,
    /// Timeout for the whole download
    pub download_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model_url: None,
            model_path: PathBuf::from("diabetes_prediction_model.onnx"),
            expected_sha256: None,
            max_model_bytes: 64 * 1024 * 1024, // 64MB
            download_timeout: Duration::from_secs(120),
        }
    }
}

/// Fetches, verifies and loads the classifier artifact
pub struct ModelProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl ModelProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.download_timeout)
            .build()
            .map_err(|e| ModelError::Fetch {
                url: config.model_url.clone().unwrap_or_default(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Make sure the artifact is cached locally, then load it
    pub async fn ensure_available(&self) -> Result<ModelHandle, ModelError> {
        let path = &self.config.model_path;

        if path.exists() {
            debug!(path = %path.display(), "Using cached model artifact");
        } else {
            let url = self
                .config
                .model_url
                .as_deref()
                .ok_or_else(|| ModelError::NotAvailable {
                    path: path.display().to_string(),
                })?;
            self.download(url, path).await?;
        }

        let bytes = fs::read(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.verify_checksum(path, &bytes)?;

        ModelHandle::from_bytes(&bytes, path)
    }

    /// Download `url` to `path` with a whole-file GET
    pub async fn download(&self, url: &str, path: &Path) -> Result<(), ModelError> {
        let fetch_err = |reason: String| ModelError::Fetch {
            url: url.to_string(),
            reason,
        };

        let parsed = url::Url::parse(url).map_err(|e| fetch_err(format!("invalid URL: {}", e)))?;

        info!(url = %parsed, path = %path.display(), "Downloading model artifact");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP status {}", status)));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_model_bytes {
                return Err(fetch_err(format!(
                    "model size {} exceeds maximum {}",
                    len, self.config.max_model_bytes
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_err(format!("failed to read body: {}", e)))?;

        if body.len() > self.config.max_model_bytes {
            return Err(fetch_err(format!(
                "model size {} exceeds maximum {}",
                body.len(),
                self.config.max_model_bytes
            )));
        }
        if body.is_empty() {
            return Err(fetch_err("empty response body".to_string()));
        }

        save_model(path, &body)?;

        info!(
            path = %path.display(),
            size = body.len(),
            checksum = %compute_checksum(&body),
            "Model artifact downloaded"
        );
        Ok(())
    }

    fn verify_checksum(&self, path: &Path, bytes: &[u8]) -> Result<(), ModelError> {
        let Some(expected) = self.config.expected_sha256.as_deref() else {
            return Ok(());
        };
        let actual = compute_checksum(bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            warn!(
                path = %path.display(),
                expected = %expected,
                actual = %actual,
                "Model checksum mismatch"
            );
            return Err(ModelError::Checksum {
                path: path.display().to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
        debug!(checksum = %actual, "Model checksum validated");
        Ok(())
    }
}

/// Fetch the artifact into `local_path` if absent, then deserialize it
pub async fn ensure_model_available(
    location: Option<&str>,
    local_path: &Path,
) -> Result<ModelHandle, ModelError> {
    let provider = ModelProvider::new(ProviderConfig {
        model_url: location.map(str::to_string),
        model_path: local_path.to_path_buf(),
        ..Default::default()
    })?;
    provider.ensure_available().await
}

/// Write model bytes to a temp file, sync, then rename into place
fn save_model(path: &Path, bytes: &[u8]) -> Result<(), ModelError> {
    let io_err = |p: &Path, source: std::io::Error| ModelError::Io {
        path: p.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        discard_temp(&temp_path);
        return Err(io_err(&temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        discard_temp(&temp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn discard_temp(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %temp_path.display(), error = %e, "Failed to remove partial model file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_provider_config_default() {
        let config = ProviderConfig::default();
        assert!(config.model_url.is_none());
        assert_eq!(config.max_model_bytes, 64 * 1024 * 1024);
        assert_eq!(config.download_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_save_model_creates_parent_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("model.json");
        save_model(&path, b"{}").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"{}");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory at the target path makes the final rename fail
        let path = dir.path().join("model.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        let err = save_model(&path, b"{}").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
        assert!(!dir.path().join("model.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_model_without_url() {
        let dir = TempDir::new().unwrap();
        let err = ensure_model_available(None, &dir.path().join("model.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::NotAvailable { .. }));
    }

    #[tokio::test]
    async fn test_invalid_url_is_fetch_error() {
        let dir = TempDir::new().unwrap();
        let err = ensure_model_available(Some("not a url"), &dir.path().join("model.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Fetch { .. }));
    }
}
