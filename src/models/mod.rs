//! Classifier model management
//!
//! This module covers everything between the weights artifact on disk and
//! an inference-ready handle:
//! - Locating the artifact across candidate directories
//! - Building the ResNet-18 classifier
//! - Loading weights through the fallback ladder
//! - Publishing and atomically reloading the shared handle

pub mod architecture;
pub mod handle;
pub mod loader;
pub mod resolver;
pub mod service;
pub mod state;

// Re-export key types for convenience
pub use architecture::{HeadKind, TumorNet};
pub use handle::{ModelHandle, ModelSlot};
pub use loader::{AttemptOutcome, ClassifierLoader, LoadReport, Rung, RungOutcome, LADDER};
pub use resolver::ModelResolver;
pub use service::{ModelService, ModelStatus};
pub use state::{LoaderEvent, LoaderState};
