//! Structured extraction from generator output
//!
//! Strategies are tried in [`STRATEGIES`] order and the first that parses
//! wins. Each strategy is a total function from text to an optional raw
//! payload; validation and sanitizing happen once, after extraction.

use crate::errors::{NeuroError, Result};
use crate::types::{RecommendationPayload, Urgency};
use serde::{Deserialize, Serialize};

/// Ways of locating the JSON object in generator output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Whole trimmed text is the object
    Direct,
    /// Object wrapped in a (labeled) code fence
    FencedBlock,
    /// Substring from the first `{` to the last `}`
    BraceSpan,
}

/// Strategies in the order they are attempted
pub const STRATEGIES: [ExtractionStrategy; 3] = [
    ExtractionStrategy::Direct,
    ExtractionStrategy::FencedBlock,
    ExtractionStrategy::BraceSpan,
];

impl ExtractionStrategy {
    pub fn apply(self, text: &str) -> Option<RawPayload> {
        match self {
            ExtractionStrategy::Direct => parse_direct(text),
            ExtractionStrategy::FencedBlock => parse_fenced(text),
            ExtractionStrategy::BraceSpan => parse_brace_span(text),
        }
    }
}

/// Payload as the generator wrote it, before sanitizing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPayload {
    pub summary: String,
    pub recommendation: String,
    #[serde(rename = "followUp", alias = "follow_up")]
    pub follow_up: String,
    pub urgency: String,
}

impl RawPayload {
    /// Sanitize every field and validate urgency and non-empty text
    pub fn into_payload(self) -> Result<RecommendationPayload> {
        let urgency: Urgency = sanitize(&self.urgency)
            .parse()
            .map_err(NeuroError::RecommendationUnavailable)?;

        let payload = RecommendationPayload {
            summary: sanitize(&self.summary),
            recommendation: sanitize(&self.recommendation),
            follow_up: sanitize(&self.follow_up),
            urgency,
        };

        if !payload.is_complete() {
            return Err(NeuroError::RecommendationUnavailable(
                "Generated payload has empty fields".to_string(),
            ));
        }

        Ok(payload)
    }
}

/// First strategy that yields a payload
pub fn extract(text: &str) -> Option<(ExtractionStrategy, RawPayload)> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy.apply(text).map(|raw| (*strategy, raw)))
}

pub fn parse_direct(text: &str) -> Option<RawPayload> {
    serde_json::from_str(text.trim()).ok()
}

pub fn parse_fenced(text: &str) -> Option<RawPayload> {
    let inner = text.trim().strip_prefix("```")?.strip_suffix("```")?;
    // Drop the language label (```json)
    let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    serde_json::from_str(inner.trim()).ok()
}

pub fn parse_brace_span(text: &str) -> Option<RawPayload> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Strip markdown emphasis and bullet markers, then collapse whitespace.
///
/// A `-` followed by a space is removed wherever it appears, so `"up- soon"`
/// becomes `"up soon"`. Hyphens inside words are kept.
pub fn sanitize(text: &str) -> String {
    text.replace('*', "")
        .replace("- ", "")
        .split_whitespace()
        .filter(|token| *token != "-")
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECT: &str = r#"{"summary":"x","recommendation":"y","followUp":"z","urgency":"high"}"#;

    #[test]
    fn test_direct() {
        let (strategy, raw) = extract(&format!("  {}\n", OBJECT)).unwrap();
        assert_eq!(strategy, ExtractionStrategy::Direct);
        assert_eq!(raw.summary, "x");
    }

    #[test]
    fn test_fenced_block() {
        let text = format!("```json\n{}\n```", OBJECT);
        assert!(parse_direct(&text).is_none());
        let (strategy, raw) = extract(&text).unwrap();
        assert_eq!(strategy, ExtractionStrategy::FencedBlock);
        assert_eq!(raw.follow_up, "z");
    }

    #[test]
    fn test_unlabeled_fence() {
        let text = format!("```\n{}\n```", OBJECT);
        assert!(parse_fenced(&text).is_some());
    }

    #[test]
    fn test_brace_span() {
        let text = format!("noise {} trailing", OBJECT);
        let (strategy, raw) = extract(&text).unwrap();
        assert_eq!(strategy, ExtractionStrategy::BraceSpan);
        assert_eq!(raw.urgency, "high");
    }

    #[test]
    fn test_garbage() {
        assert!(extract("I cannot help with that.").is_none());
        assert!(extract("} backwards {").is_none());
        assert!(extract(r#"{"summary":"only one key"}"#).is_none());
    }

    #[test]
    fn test_snake_case_follow_up_alias() {
        let text = r#"{"summary":"a","recommendation":"b","follow_up":"c","urgency":"low"}"#;
        assert_eq!(parse_direct(text).unwrap().follow_up, "c");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("**Finding:** - severe   issue"), "Finding: severe issue");
        assert_eq!(sanitize("- first\n- second"), "first second");
        assert_eq!(sanitize("follow-up in 7-10 days"), "follow-up in 7-10 days");
    }

    #[test]
    fn test_sanitize_attached_dash() {
        assert_eq!(sanitize("follow up-  soon"), "follow up soon");
        assert_eq!(sanitize("Refer -\n- urgently"), "Refer urgently");
    }

    #[test]
    fn test_into_payload_sanitizes_and_validates() {
        let raw = RawPayload {
            summary: "**Mass** noted".into(),
            recommendation: "- Refer\n- Image".into(),
            follow_up: "MRI  in 6 weeks".into(),
            urgency: " Medium ".into(),
        };
        let payload = raw.into_payload().unwrap();
        assert_eq!(payload.summary, "Mass noted");
        assert_eq!(payload.recommendation, "Refer Image");
        assert_eq!(payload.follow_up, "MRI in 6 weeks");
        assert_eq!(payload.urgency, Urgency::Medium);
    }

    #[test]
    fn test_into_payload_rejects_bad_urgency_and_empty_fields() {
        let bad_urgency = RawPayload {
            summary: "a".into(),
            recommendation: "b".into(),
            follow_up: "c".into(),
            urgency: "critical".into(),
        };
        assert!(bad_urgency.into_payload().is_err());

        let empty = RawPayload {
            summary: "***".into(),
            recommendation: "b".into(),
            follow_up: "c".into(),
            urgency: "low".into(),
        };
        assert!(empty.into_payload().is_err());
    }
}
