//! Inference module
//!
//! Image preprocessing and the classification engine.

pub mod engine;
pub mod preprocess;

// Re-export commonly used items
pub use engine::{classify, softmax_distribution};
pub use preprocess::{preprocess, INPUT_SIZE};
