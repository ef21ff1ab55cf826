//! Recommendation synthesis module
//!
//! Provides the text-generation client, prompt construction, layered JSON
//! extraction and the deterministic fallback table.

pub mod client;
pub mod extract;
pub mod fallback;
pub mod prompt;
pub mod synthesizer;

// Re-export commonly used types
pub use client::{GeminiClient, TextGenerator, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
pub use extract::{extract, sanitize, ExtractionStrategy, RawPayload, STRATEGIES};
pub use fallback::fallback_payload;
pub use prompt::build_prompt;
pub use synthesizer::{RecommendationOrigin, RecommendationSynthesizer, Synthesis};
