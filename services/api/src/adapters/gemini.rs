//! services/api/src/adapters/gemini.rs
//!
//! The Gemini adapter: implements the `LectureGenerator` port against the
//! `generateContent` REST endpoint. Strategy A inlines the uploaded PDF as a
//! base64 `inline_data` part next to the prompt.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use lectern_core::ports::{GeneratorError, LectureGenerator, PdfAttachment};
use serde_json::{json, Value};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// A `LectureGenerator` backed by the Gemini API.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    /// Creates a new generator. A missing API key is allowed at construction;
    /// calls fail with [`GeneratorError::Unconfigured`] until one is set.
    pub fn new(client: reqwest::Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LectureGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        attachment: Option<&PdfAttachment>,
    ) -> Result<String, GeneratorError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GeneratorError::Unconfigured)?;

        let mut parts = vec![json!({ "text": prompt })];
        if let Some(pdf) = attachment {
            parts.push(json!({
                "inline_data": {
                    "mime_type": pdf.mime_type,
                    "data": STANDARD.encode(&pdf.bytes),
                }
            }));
        }
        let body = json!({ "contents": [{ "parts": parts }] });

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, key
        );
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Service(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeneratorError::Service(format!("HTTP {status}")));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| GeneratorError::Service(e.to_string()))?;

        // Candidates carry their text split across parts; concatenate them.
        let text: String = data["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        debug!(chars = text.len(), "model returned fragment");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_fast_without_a_request() {
        // base_url is unroutable: reaching it would fail the test with a
        // Service error rather than Unconfigured.
        let gen = GeminiGenerator::new(reqwest::Client::new(), None, "gemini-test".into())
            .with_base_url("http://127.0.0.1:1");
        let err = gen.generate("prompt", None).await.unwrap_err();
        assert!(matches!(err, GeneratorError::Unconfigured));
    }
}
