//! NeuroTrix - Brain MRI classification and recommendation pipeline
//!
//! Classifies a brain MRI scan into one of four categories and turns the
//! result plus patient context into a structured clinical recommendation.
//!
//! # Architecture
//!
//! - **models**: weights resolution, loading ladder, shared handle with atomic reload
//! - **inference**: image preprocessing and the classification engine
//! - **recommendation**: text-generation client, JSON extraction, fallback table
//! - **pipeline**: end-to-end analysis combining the above

pub mod errors;
pub mod types;
pub mod config;
pub mod models;
pub mod inference;
pub mod recommendation;
pub mod pipeline;
pub mod cli;

// Re-export commonly used types
pub use errors::{NeuroError, Result};
pub use pipeline::{AnalysisReport, DiagnosticPipeline};
pub use types::{Category, ClassificationResult, PatientContext, RecommendationPayload, Urgency};
