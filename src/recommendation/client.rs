//! Text-generation client
//!
//! Provides the [`TextGenerator`] seam and a Gemini implementation:
//! - Endpoint: POST /v1beta/models/{model}:generateContent
//! - Single text prompt in, concatenated candidate text out

use crate::config::RecommendationConfig;
use crate::errors::{NeuroError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default Gemini API endpoint
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Transport-level timeout; the synthesizer applies its own, usually shorter, deadline
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Anything that turns a prompt into free-form text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Identifier used in logs
    fn name(&self) -> &str;
}

/// Gemini REST client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create client with default endpoint and model
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, api_key)
    }

    /// Create client with custom configuration
    pub fn with_config(endpoint: &str, model: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NeuroError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Client for the configured model, or `None` when no API key is set
    pub fn from_config(config: &RecommendationConfig) -> Result<Option<Self>> {
        match config.api_key() {
            Some(key) => Self::with_config(&config.endpoint, &config.model, &key).map(Some),
            None => Ok(None),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| NeuroError::RecommendationUnavailable(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NeuroError::RecommendationUnavailable(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| NeuroError::RecommendationUnavailable(format!("Failed to parse response: {}", e)))?;

        body.text().ok_or_else(|| {
            NeuroError::RecommendationUnavailable("Response contained no text".to_string())
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// generateContent response body (fields we use)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("test-key").unwrap();
        assert_eq!(client.model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(client.endpoint(), DEFAULT_GEMINI_ENDPOINT);
        assert_eq!(client.name(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_url_and_debug_hide_key() {
        let client =
            GeminiClient::with_config("http://localhost:9000/", "gemini-test", "secret").unwrap();
        assert_eq!(
            client.url(),
            "http://localhost:9000/v1beta/models/gemini-test:generateContent"
        );
        assert!(!format!("{:?}", client).contains("secret"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest::from_prompt("hello")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}],"role":"model"}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let raw = r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_from_config_without_key() {
        let mut config = RecommendationConfig::default();
        config.api_key_env = "NEUROTRIX_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(GeminiClient::from_config(&config).unwrap().is_none());
    }
}
