//! services/api/src/adapters/ocr_http.rs
//!
//! OCR over a remote HTTP service. The pipeline posts one page image per
//! call; the service responds with `{"text": "..."}`.

use async_trait::async_trait;
use lectern_core::ports::{OcrError, OcrService};
use serde_json::Value;

/// An `OcrService` that talks to a remote recognition endpoint.
#[derive(Clone)]
pub struct RemoteOcr {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOcr {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl OcrService for RemoteOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| OcrError::Service(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OcrError::Service(format!("HTTP {status}")));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| OcrError::Service(e.to_string()))?;
        data["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| OcrError::Service("response missing 'text' field".to_string()))
    }
}
