use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clinical urgency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            other => Err(format!("Unknown urgency level: {}", other)),
        }
    }
}

/// Structured recommendation returned with every analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPayload {
    pub summary: String,
    pub recommendation: String,
    pub follow_up: String,
    pub urgency: Urgency,
}

impl RecommendationPayload {
    /// All text fields carry content
    pub fn is_complete(&self) -> bool {
        [&self.summary, &self.recommendation, &self.follow_up]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}
