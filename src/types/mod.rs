//! Type definitions module
//!
//! Core values flowing through the classification and recommendation pipeline.

pub mod category;
pub mod classification;
pub mod patient;
pub mod recommendation;

// Re-export commonly used types
pub use category::{Category, CATEGORY_SET, NUM_CLASSES};
pub use classification::{argmax_first, ClassProbability, ClassificationResult, ResultSource};
pub use patient::PatientContext;
pub use recommendation::{RecommendationPayload, Urgency};
