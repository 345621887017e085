//! Gemini API client for transaction classification
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::classifier::Classifier;
use crate::error::LedgerError;
use crate::extraction::{ExtractionRequest, Part};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClassifier {
    client: Client,
    api_key: String,
    url: String,
}

impl GeminiClassifier {
    pub fn new(api_key: String, model: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            url: format!("{}/{}:generateContent", GEMINI_BASE_URL, model),
        })
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, request: &ExtractionRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(LedgerError::ServiceUnavailable(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}?key={}", self.url, self.api_key);

        info!(fingerprint = %request.fingerprint(), "Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                LedgerError::ServiceUnavailable(format!("Gemini API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(LedgerError::ServiceError(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            LedgerError::ServiceError(format!("Gemini parse error: {}", e))
        })?;

        let text = extract_text(gemini_response)?;

        info!(bytes = text.len(), "Gemini response received");

        Ok(text)
    }
}

/// Pull the first candidate's text out of the response envelope
fn extract_text(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LedgerError::ServiceError("No response from Gemini API".to_string()))?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason == "SAFETY" || reason == "RECITATION" {
            return Err(LedgerError::ServiceError(format!(
                "Gemini stopped generation: {}",
                reason
            )));
        }
    }

    candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| LedgerError::ServiceError("Empty response from Gemini".to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionRequestBuilder;
    use crate::taxonomy::Taxonomy;

    fn parse(raw: &str) -> GeminiResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_extract_first_candidate_text() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"item\":\"coffee\"}"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), r#"{"item":"coffee"}"#);
    }

    #[test]
    fn test_empty_candidates_is_service_error() {
        let response = parse(r#"{"candidates":[]}"#);
        assert!(matches!(extract_text(response), Err(LedgerError::ServiceError(_))));

        let response = parse(r#"{}"#);
        assert!(matches!(extract_text(response), Err(LedgerError::ServiceError(_))));
    }

    #[test]
    fn test_safety_stop_is_service_error() {
        let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(extract_text(response), Err(LedgerError::ServiceError(_))));
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let classifier = GeminiClassifier::new(String::new(), "gemini-2.0-flash").unwrap();
        let request = ExtractionRequestBuilder::new(&Taxonomy::standard()).build("taxi 12000");

        assert!(matches!(
            classifier.classify(&request).await,
            Err(LedgerError::ServiceUnavailable(_))
        ));
    }
}
