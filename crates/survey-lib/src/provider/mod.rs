//! Classifier artifact provider
//!
//! This module provides:
//! - Fetch-if-absent download of the model artifact
//! - Optional SHA256 verification before deserialization
//! - The immutable `ModelHandle` threaded into the predictor

mod artifact;
mod fetch;

pub use artifact::{compute_checksum, ModelHandle, ModelInfo};
pub use fetch::{ensure_model_available, ModelProvider, ProviderConfig};
