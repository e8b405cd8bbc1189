use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ContentGenerator, ExternalError, UpstreamResponse};
use crate::config::GeminiConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, ExternalError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExternalError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, payload: &Value) -> Result<UpstreamResponse, ExternalError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| ExternalError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ExternalError::Transport(e.to_string()))?;

        let body = serde_json::from_str(&text).map_err(|e| {
            warn!(status, error = %e, "generator response is not JSON");
            ExternalError::InvalidResponse(format!("status {status}: {e}"))
        })?;

        debug!(status, "generator responded");
        Ok(UpstreamResponse { status, body })
    }
}
