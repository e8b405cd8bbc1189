//! External service clients.

pub mod gemini;
pub mod prompts;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use gemini::GeminiClient;
pub use prompts::{candidate_text, disease_payload, extract_json_object, fertilizer_payload, FertilizerQuery};

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("generator request failed: {0}")]
    Transport(String),

    #[error("generator returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Status and JSON body returned by the generator, passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A generative-AI backend that accepts `generateContent` payloads.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, payload: &Value) -> Result<UpstreamResponse, ExternalError>;
}
