//! Recommendation synthesizer
//!
//! Always produces exactly one well-formed payload. The generator path is
//! attempted only when a generator is configured; any failure along it
//! (transport, timeout, unparseable or invalid output) is absorbed by the
//! fallback table.

use crate::config::RecommendationConfig;
use crate::errors::{NeuroError, Result};
use crate::recommendation::client::{GeminiClient, TextGenerator};
use crate::recommendation::extract::{extract, ExtractionStrategy};
use crate::recommendation::fallback::fallback_payload;
use crate::recommendation::prompt::build_prompt;
use crate::types::{ClassificationResult, PatientContext, RecommendationPayload};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default deadline for one generator call
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Which path produced the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationOrigin {
    Generated { strategy: ExtractionStrategy },
    Fallback { reason: String },
}

/// Payload plus its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub payload: RecommendationPayload,
    pub origin: RecommendationOrigin,
}

impl Synthesis {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, RecommendationOrigin::Fallback { .. })
    }
}

/// Builds recommendations from classification results
#[derive(Clone)]
pub struct RecommendationSynthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl RecommendationSynthesizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Synthesizer that only ever uses the fallback table
    pub fn offline() -> Self {
        Self::new(None, DEFAULT_GENERATION_TIMEOUT)
    }

    /// Gemini-backed synthesizer when an API key is configured, offline otherwise
    pub fn from_config(config: &RecommendationConfig) -> Self {
        let generator: Option<Arc<dyn TextGenerator>> = match GeminiClient::from_config(config) {
            Ok(Some(client)) => {
                info!(model = %client.model(), "Text generation enabled");
                Some(Arc::new(client))
            }
            Ok(None) => {
                info!(env = %config.api_key_env, "No API key set; using fallback recommendations");
                None
            }
            Err(err) => {
                warn!(error = %err, "Could not build text generation client; using fallback recommendations");
                None
            }
        };
        Self::new(generator, config.timeout())
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn synthesize(
        &self,
        result: &ClassificationResult,
        patient: &PatientContext,
    ) -> Synthesis {
        let generator = match &self.generator {
            Some(generator) => generator,
            None => return Self::fallback(result, patient, "no text generator configured"),
        };

        match self.generate(generator.as_ref(), result, patient).await {
            Ok((payload, strategy)) => {
                debug!(generator = %generator.name(), ?strategy, "Generated recommendation");
                Synthesis {
                    payload,
                    origin: RecommendationOrigin::Generated { strategy },
                }
            }
            Err(err) => {
                warn!(generator = %generator.name(), error = %err, "Recommendation generation failed; using fallback");
                Self::fallback(result, patient, &err.to_string())
            }
        }
    }

    async fn generate(
        &self,
        generator: &dyn TextGenerator,
        result: &ClassificationResult,
        patient: &PatientContext,
    ) -> Result<(RecommendationPayload, ExtractionStrategy)> {
        let prompt = build_prompt(result, patient);

        let text = tokio::time::timeout(self.timeout, generator.generate(&prompt))
            .await
            .map_err(|_| NeuroError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            })??;

        let (strategy, raw) = extract(&text).ok_or_else(|| {
            NeuroError::RecommendationUnavailable(
                "No JSON object could be extracted from generator output".to_string(),
            )
        })?;

        Ok((raw.into_payload()?, strategy))
    }

    fn fallback(result: &ClassificationResult, patient: &PatientContext, reason: &str) -> Synthesis {
        Synthesis {
            payload: fallback_payload(result, patient),
            origin: RecommendationOrigin::Fallback {
                reason: reason.to_string(),
            },
        }
    }
}
