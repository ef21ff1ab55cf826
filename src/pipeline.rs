//! Diagnostic pipeline
//!
//! Combines preprocessing, classification and recommendation synthesis into
//! one analysis. Only image-decode and inference faults reach the caller;
//! a missing model and an unavailable generator are both absorbed.

use crate::config::Config;
use crate::errors::{NeuroError, Result};
use crate::inference::{classify, preprocess};
use crate::models::ModelService;
use crate::recommendation::RecommendationSynthesizer;
use crate::types::{ClassificationResult, PatientContext, RecommendationPayload};
use candle_core::Device;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Combined response for one scan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub patient_info: PatientContext,
    pub classification: ClassificationResult,
    pub recommendation: RecommendationPayload,
}

/// Shared entry point for analysis requests
#[derive(Clone)]
pub struct DiagnosticPipeline {
    models: Arc<ModelService>,
    synthesizer: RecommendationSynthesizer,
    device: Device,
}

impl DiagnosticPipeline {
    pub fn new(models: Arc<ModelService>, synthesizer: RecommendationSynthesizer) -> Self {
        Self {
            models,
            synthesizer,
            device: Device::Cpu,
        }
    }

    /// Load the classifier and configure the synthesizer from configuration
    pub async fn from_config(config: &Config) -> Self {
        let models = Arc::new(ModelService::from_config(config).await);
        let synthesizer = RecommendationSynthesizer::from_config(&config.recommendation);
        Self::new(models, synthesizer)
    }

    pub fn models(&self) -> &Arc<ModelService> {
        &self.models
    }

    /// Decode and classify; CPU-bound work runs on the blocking pool
    pub async fn classify(&self, image_bytes: Vec<u8>) -> Result<ClassificationResult> {
        let slot = self.models.snapshot().await;
        let device = self.device.clone();

        tokio::task::spawn_blocking(move || {
            let input = preprocess(&image_bytes, &device)?;
            classify(&slot, &input)
        })
        .await
        .map_err(|e| NeuroError::Inference(format!("Classification task failed: {}", e)))?
    }

    /// Full analysis: classification plus recommendation
    pub async fn analyze(&self, image_bytes: Vec<u8>, patient: PatientContext) -> Result<AnalysisReport> {
        let start = Instant::now();
        let classification = self.classify(image_bytes).await?;
        let synthesis = self.synthesizer.synthesize(&classification, &patient).await;

        info!(
            class = %classification.predicted,
            confidence = classification.confidence,
            source = ?classification.source,
            origin = ?synthesis.origin,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            patient_info: patient,
            classification,
            recommendation: synthesis.payload,
        })
    }
}
