//! # Description Generator
//!
//! Writes a short bounty description from a title using the Gemini
//! `generateContent` REST endpoint.
//!
//! The call never fails from the caller's point of view: a missing API
//! key or any transport/decoding error yields a fixed fallback text.
//!
//! ## Request Flow
//!
//! ```text
//! BountyBoard.generate_description(title)
//!              │
//!              ├── no GEMINI_API_KEY ──► PLACEHOLDER_NO_KEY
//!              │
//!              └── POST {api}/models/{model}:generateContent
//!                        │
//!                        ├── 2xx + text ──► trimmed text
//!                        └── anything else ──► FALLBACK_ON_FAILURE
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Returned when no API key is configured.
pub const PLACEHOLDER_NO_KEY: &str = "API Key not configured. Using placeholder description.";

/// Returned when the request or its decoding fails.
pub const FALLBACK_ON_FAILURE: &str = "Failed to generate description. Please write one manually.";

/// Source of bounty descriptions.
///
/// Object-safe so the board can hold an `Arc<dyn DescriptionGenerator>`.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    /// Produce a description for `prompt`. Never fails; falls back to a
    /// fixed text instead.
    async fn generate(&self, prompt: &str) -> String;

    /// Whether a real backend is configured.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, thiserror::Error)]
enum GenerateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini-backed generator.
#[derive(Clone)]
pub struct GeminiDescriptionGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
}

impl GeminiDescriptionGenerator {
    /// Build the generator with a 10 s request timeout.
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            api_url: config.gemini_api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn request(&self, api_key: &str, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": build_prompt(prompt) }]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "topP": 1,
                "topK": 1,
                "maxOutputTokens": 200
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed = resp.json::<GenerateContentResponse>().await?;
        extract_text(parsed).ok_or(GenerateError::EmptyResponse)
    }
}

#[async_trait]
impl DescriptionGenerator for GeminiDescriptionGenerator {
    async fn generate(&self, prompt: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No Gemini API key, returning placeholder description");
            return PLACEHOLDER_NO_KEY.to_string();
        };

        match self.request(api_key, prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Description generation failed: {}", e);
                FALLBACK_ON_FAILURE.to_string()
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn build_prompt(request: &str) -> String {
    format!(
        "Based on the following request, write a clear and exciting bounty description for an online gaming platform. Keep it under 150 characters. Request: \"{}\"",
        request
    )
}

fn extract_text(resp: GenerateContentResponse) -> Option<String> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Fixed-text generator for tests.
#[cfg(test)]
pub(crate) struct StaticDescriptionGenerator(pub String);

#[cfg(test)]
#[async_trait]
impl DescriptionGenerator for StaticDescriptionGenerator {
    async fn generate(&self, _prompt: &str) -> String {
        self.0.clone()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_without_key() {
        let config = AppConfig::default();
        let generator = GeminiDescriptionGenerator::new(&config).unwrap();

        assert!(!generator.is_configured());
        assert_eq!(generator.generate("五排缺辅助").await, PLACEHOLDER_NO_KEY);
    }

    #[tokio::test]
    async fn test_fallback_on_unreachable_endpoint() {
        let config = AppConfig {
            gemini_api_key: Some("test-key".into()),
            gemini_api_url: "http://127.0.0.1:9".into(),
            ..AppConfig::default()
        };
        let generator = GeminiDescriptionGenerator::new(&config).unwrap();

        assert_eq!(generator.generate("五排缺辅助").await, FALLBACK_ON_FAILURE);
    }

    #[test]
    fn test_prompt_embeds_request() {
        let prompt = build_prompt("急求大神");
        assert!(prompt.contains("Request: \"急求大神\""));
        assert!(prompt.contains("under 150 characters"));
    }

    #[test]
    fn test_extract_text() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  速来组队，奖励丰厚！ " }] }
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).as_deref(), Some("速来组队，奖励丰厚！"));

        let empty: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(extract_text(empty).is_none());
    }
}
