//! Classification result types
//!
//! A result always reports where it came from, so a placeholder produced
//! without a model can be told apart from a genuine inference without
//! inspecting the numbers.

use crate::errors::{NeuroError, Result};
use crate::types::category::{Category, CATEGORY_SET, NUM_CLASSES};
use serde::{Deserialize, Serialize};

/// Confidence reported by the placeholder result
pub const PLACEHOLDER_CONFIDENCE: f32 = 0.70;

/// Origin of a classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Strictly loaded model
    Model,
    /// Alternate-architecture model loaded non-strictly
    DegradedModel,
    /// No model available; synthetic result
    Placeholder,
}

/// Probability assigned to one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub name: Category,
    pub value: f32,
}

/// Outcome of classifying one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "class")]
    pub predicted: Category,
    pub confidence: f32,
    pub probabilities: Vec<ClassProbability>,
    pub source: ResultSource,
}

impl ClassificationResult {
    /// Build a result from a probability distribution in canonical order
    pub fn from_distribution(distribution: &[f32], source: ResultSource) -> Result<Self> {
        if distribution.len() != NUM_CLASSES {
            return Err(NeuroError::Inference(format!(
                "Expected {} class probabilities, got {}",
                NUM_CLASSES,
                distribution.len()
            )));
        }
        if distribution.iter().any(|p| !p.is_finite()) {
            return Err(NeuroError::Inference(
                "Non-finite value in probability distribution".to_string(),
            ));
        }

        let top = argmax_first(distribution)
            .ok_or_else(|| NeuroError::Inference("Empty distribution".to_string()))?;

        let probabilities = CATEGORY_SET
            .iter()
            .zip(distribution)
            .map(|(&name, &value)| ClassProbability { name, value })
            .collect();

        Ok(Self {
            predicted: CATEGORY_SET[top],
            confidence: distribution[top],
            probabilities,
            source,
        })
    }

    /// Synthetic result used when no model is loaded
    pub fn placeholder() -> Self {
        let remainder = (1.0 - PLACEHOLDER_CONFIDENCE) / (NUM_CLASSES - 1) as f32;
        let probabilities = CATEGORY_SET
            .iter()
            .map(|&name| ClassProbability {
                name,
                value: if name == Category::NoTumor {
                    PLACEHOLDER_CONFIDENCE
                } else {
                    remainder
                },
            })
            .collect();

        Self {
            predicted: Category::NoTumor,
            confidence: PLACEHOLDER_CONFIDENCE,
            probabilities,
            source: ResultSource::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == ResultSource::Placeholder
    }

    pub fn confidence_percent(&self) -> f32 {
        self.confidence * 100.0
    }

    pub fn probability_of(&self, category: Category) -> f32 {
        self.probabilities
            .iter()
            .find(|p| p.name == category)
            .map(|p| p.value)
            .unwrap_or(0.0)
    }
}

/// Index of the largest value; exact ties resolve to the lowest index
pub fn argmax_first(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
