//! Diabetes survey prediction library
//!
//! This crate provides the core functionality for:
//! - The frozen feature schema of the survey classifier
//! - Validating and encoding survey answers
//! - Fetching, verifying and loading the classifier artifact
//! - Inference and output formatting
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod provider;
pub mod schema;

pub use error::{InferenceError, ModelError, SurveyError, ValidationError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{StructuredLogger, SurveyMetrics};
pub use predictor::{encode, encode_and_predict, predict, validate};
pub use provider::{ensure_model_available, ModelHandle, ModelInfo};
