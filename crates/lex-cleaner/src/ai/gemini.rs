//! Google Gemini summary provider implementation.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`SummaryProvider`] trait for Google's Gemini API (<https://ai.google.dev/>).

use std::time::Duration;

use super::{SummaryProvider, build_summary_prompt};
use crate::table::SampleRow;
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

/// Default Gemini API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";

/// Default model to use for dataset descriptions.
const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

const REQUEST_TIMEOUT_SECS: u64 = 30;

const TEMPERATURE: f32 = 0.0;

/// Upper bound on the description length.
const MAX_OUTPUT_TOKENS: u32 = 512;

// Gemini API request structures
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

// Gemini API response structures
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String> {
        let candidate = self
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or_else(|| anyhow!("No candidates in Gemini response"))?;

        if let Some(reason) = &candidate.finish_reason
            && (reason == "SAFETY" || reason == "BLOCKED")
        {
            return Err(anyhow!("Gemini response blocked ({})", reason));
        }

        let text: String = candidate
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(anyhow!("No response content from Gemini API"));
        }
        Ok(text)
    }
}

/// Google Gemini provider for dataset descriptions.
///
/// Temperature and output length are fixed; only the model and endpoint vary.
///
/// ```rust,ignore
/// use lex_cleaner::ai::GeminiProvider;
///
/// let provider = GeminiProvider::new("your-api-key")?.with_model("gemini-2.0-flash");
/// ```
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    /// Provider for `gemini-2.5-flash-lite` at the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            client,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send requests to `base_url` (a proxy, say) instead of the public API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    fn call_api(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);

        // Build URL: {base_url}{model}:generateContent?key={api_key}
        let url = format!(
            "{}{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Gemini API error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let result: GeminiResponse = response.json()?;
        result.into_text()
    }
}

impl SummaryProvider for GeminiProvider {
    fn summarize(&self, columns: &[String], sample: &[SampleRow]) -> Result<String> {
        let prompt = build_summary_prompt(columns, sample);
        self.call_api(&prompt)
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    // -------------------------------------------------------------------------
    // GeminiResponse parsing tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_valid_response_text() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "A table of customer orders."}]},
                    "finishReason": "STOP"
                }]
            }"#,
        );
        assert_eq!(response.into_text().unwrap(), "A table of customer orders.");
    }

    #[test]
    fn test_multiple_parts_are_joined() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "First. "}, {"text": "Second."}]},
                    "finishReason": "STOP"
                }]
            }"#,
        );
        assert_eq!(response.into_text().unwrap(), "First. Second.");
    }

    #[test]
    fn test_empty_candidates_is_error() {
        assert!(parse(r#"{"candidates": []}"#).into_text().is_err());
        assert!(parse(r#"{"candidates": null}"#).into_text().is_err());
    }

    #[test]
    fn test_missing_content_is_error() {
        let response = parse(r#"{"candidates": [{"content": null, "finishReason": "STOP"}]}"#);
        assert!(response.into_text().is_err());

        let response =
            parse(r#"{"candidates": [{"content": {"parts": null}, "finishReason": "STOP"}]}"#);
        assert!(response.into_text().is_err());
    }

    #[test]
    fn test_safety_blocked_is_error() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "x"}]}, "finishReason": "SAFETY"}]}"#,
        );
        let error = response.into_text().unwrap_err();
        assert!(error.to_string().contains("blocked"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let result: std::result::Result<GeminiResponse, _> =
            serde_json::from_str(r#"{"candidates": "not an array"}"#);
        assert!(result.is_err());
    }

    // -------------------------------------------------------------------------
    // Request tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_request_serialization() {
        let provider = GeminiProvider::new("test-key").unwrap();
        let request = provider.build_request("describe this");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "describe this");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], MAX_OUTPUT_TOKENS);
        assert_eq!(json["generationConfig"]["temperature"], 0.0);
    }

    // -------------------------------------------------------------------------
    // Provider trait implementation tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_provider_name_and_model() {
        let provider = GeminiProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "Gemini");
        assert_eq!(provider.model(), Some(DEFAULT_MODEL));
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);

        let provider = provider.with_model("custom-model");
        assert_eq!(provider.model(), Some("custom-model"));
    }

    #[test]
    fn test_unreachable_endpoint_is_error() {
        let provider = GeminiProvider::new("test-key")
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");
        assert!(provider.summarize(&["a".to_string()], &[]).is_err());
    }
}
