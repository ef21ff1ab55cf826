//! Error types for NeuroTrix
//!
//! Only `ImageDecode` and `Inference` are meant to reach the caller of the
//! diagnostic pipeline. Loading and recommendation failures are absorbed by
//! the loader ladder and the fallback table respectively.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the classification and recommendation pipeline
#[derive(Error, Debug)]
pub enum NeuroError {
    /// Loader state machine transition errors
    #[error("Invalid loader transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    /// Weights artifact missing at every candidate location
    #[error("Model weights not found; tried: {}", display_paths(.tried))]
    ResourceNotFound { tried: Vec<PathBuf> },

    /// Strict load rejected the stored parameters
    #[error("Weight load mismatch: {0}")]
    WeightLoadMismatch(String),

    /// Image bytes could not be decoded
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Runtime fault during the forward pass
    #[error("Inference error: {0}")]
    Inference(String),

    /// External text generation failed or returned unusable output
    #[error("Recommendation unavailable: {0}")]
    RecommendationUnavailable(String),

    /// Tensor backend errors
    #[error("Tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic errors with context
    #[error("NeuroTrix error: {0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, NeuroError>;

impl From<anyhow::Error> for NeuroError {
    fn from(err: anyhow::Error) -> Self {
        NeuroError::Generic(err.to_string())
    }
}

impl NeuroError {
    /// Whether this error should be reported to the requester as a failed request
    pub fn is_request_fault(&self) -> bool {
        matches!(self, NeuroError::ImageDecode(_) | NeuroError::Inference(_))
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_not_found_lists_candidates() {
        let err = NeuroError::ResourceNotFound {
            tried: vec![PathBuf::from("a.pth"), PathBuf::from("models/a.pth")],
        };
        let msg = err.to_string();
        assert!(msg.contains("a.pth"));
        assert!(msg.contains("models/a.pth"));
    }

    #[test]
    fn test_request_faults() {
        assert!(NeuroError::ImageDecode("bad".into()).is_request_fault());
        assert!(NeuroError::Inference("nan".into()).is_request_fault());
        assert!(!NeuroError::WeightLoadMismatch("fc".into()).is_request_fault());
        assert!(!NeuroError::RecommendationUnavailable("quota".into()).is_request_fault());
    }
}
