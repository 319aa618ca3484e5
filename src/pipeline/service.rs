//! Vision-service interaction: build the request and fetch the raw payload.
//!
//! This stage is intentionally thin — all prompt text lives in
//! [`crate::prompts`] and all payload decoding in [`crate::pipeline::parse`],
//! so the network concern stays isolated behind the [`VisionService`] trait.
//! Tests inject a scripted implementation through
//! [`crate::config::ExtractionConfig::service`]; production uses
//! [`GeminiService`].
//!
//! No retry happens here: a failed call fails its batch, and a failed batch
//! aborts the run (the orchestrator's all-or-nothing policy). The only
//! transport bound is the reqwest client timeout.

use crate::config::ExtractionConfig;
use crate::error::Pdf2GridError;
use crate::prompts::{EXTRACTION_PROMPT, SYSTEM_INSTRUCTION};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

/// Default public endpoint for the Gemini API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// One call to the extraction service: PDF bytes in, raw text payload out.
///
/// The payload is *expected* to be a JSON object keyed by batch-local page
/// numbers, but no guarantee holds — the service may wrap it in fences, leak
/// commentary, or truncate it. Decoding and repair belong to
/// [`crate::pipeline::parse`], never to implementations of this trait.
#[async_trait]
pub trait VisionService: Send + Sync + std::fmt::Debug {
    /// Send one sub-document and return the service's raw text response.
    async fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, Pdf2GridError>;
}

/// [`VisionService`] backed by the Gemini `generateContent` REST API.
#[derive(Debug)]
pub struct GeminiService {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: usize,
}

impl GeminiService {
    /// Build a service from a resolved API key and the run configuration.
    pub fn new(api_key: String, config: &ExtractionConfig) -> Result<Self, Pdf2GridError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| Pdf2GridError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Assemble the `generateContent` request body.
    ///
    /// The PDF travels as inline base64 data with MIME type
    /// `application/pdf`; `responseMimeType: application/json` asks the
    /// service for JSON-typed output (which it does not always honour —
    /// hence the parser's repair strategies).
    fn request_body(&self, pdf_bytes: &[u8]) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": EXTRACTION_PROMPT },
                    {
                        "inlineData": {
                            "mimeType": "application/pdf",
                            "data": BASE64_STANDARD.encode(pdf_bytes),
                        }
                    }
                ]
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
                "responseMimeType": "application/json",
            }
        })
    }
}

#[async_trait]
impl VisionService for GeminiService {
    async fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, Pdf2GridError> {
        let url = self.request_url();
        debug!("POST {} ({} PDF bytes)", url, pdf_bytes.len());

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(pdf_bytes))
            .send()
            .await
            .map_err(|e| Pdf2GridError::Service {
                detail: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Pdf2GridError::Service {
                detail: format!("HTTP {}: {}", status, summarize(&body)),
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| Pdf2GridError::Service {
                detail: format!("malformed API response: {e}"),
            })?;

        response_text(parsed)
    }
}

/// Pull the concatenated text parts out of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String, Pdf2GridError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .map(|c| c.content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        return Err(Pdf2GridError::Service {
            detail: "response contained no text payload".into(),
        });
    }
    Ok(text)
}

/// Keep error bodies short enough for a terminal.
fn summarize(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(300) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

// ── Response wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> GeminiService {
        let config = ExtractionConfig::builder()
            .model("gemini-2.0-flash")
            .build()
            .unwrap();
        GeminiService::new("test-key".into(), &config).unwrap()
    }

    #[test]
    fn request_url_targets_model() {
        assert_eq!(
            service().request_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_body_carries_inline_pdf_and_json_directive() {
        let body = service().request_body(b"%PDF-fake");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["data"],
            BASE64_STANDARD.encode(b"%PDF-fake")
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("table-extraction"));
    }

    #[test]
    fn response_text_joins_parts() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"1\": " }, { "text": "[]}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(response_text(parsed).unwrap(), "{\"1\": []}");
    }

    #[test]
    fn empty_response_is_service_error() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        let err = response_text(parsed).unwrap_err();
        assert!(matches!(err, Pdf2GridError::Service { .. }));
        assert!(err.to_string().contains("no text payload"));
    }

    #[test]
    fn summarize_truncates_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(summarize(&long).len(), 300);
        assert_eq!(summarize("short"), "short");
    }
}
