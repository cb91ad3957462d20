//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use survey_lib::provider::ProviderConfig;

/// Server configuration, read from `SURVEY_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port for the survey, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Remote location of the model artifact
    #[serde(default)]
    pub model_url: Option<String>,

    /// Local cache path of the model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA256 of the model artifact
    #[serde(default)]
    pub model_sha256: Option<String>,

    #[serde(default = "default_max_model_bytes")]
    pub max_model_bytes: usize,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_api_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/diabetes_prediction_model.onnx")
}

fn default_max_model_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_download_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            model_url: None,
            model_path: default_model_path(),
            model_sha256: None,
            max_model_bytes: default_max_model_bytes(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("SURVEY").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            model_url: self.model_url.clone().filter(|u| !u.trim().is_empty()),
            model_path: self.model_path.clone(),
            expected_sha256: self.model_sha256.clone().filter(|s| !s.trim().is_empty()),
            max_model_bytes: self.max_model_bytes,
            download_timeout: Duration::from_secs(self.download_timeout_secs),
        }
    }
}
