//! Provider boundary: send a prompt, get raw text back.
//!
//! Implementations (HTTP clients, fixtures) live in infra. The returned text is
//! opaque here; shaping it is the normalizer's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub const DEFAULT_MAX_TOKENS: u32 = 4000;
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("completion provider is not configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider request timed out")]
    Timeout,

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no content")]
    EmptyResponse,

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Worth retrying: network trouble, rate limiting, or a server-side failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) | ProviderError::Timeout => true,
            ProviderError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            ProviderError::NotConfigured
            | ProviderError::EmptyResponse
            | ProviderError::InvalidResponse(_) => false,
        }
    }
}

/// Anything that can turn a prompt into raw model text.
#[async_trait]
pub trait CompletionProvider: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let req = CompletionRequest::new("m", "p");
        assert_eq!(req.max_tokens, 4000);
        assert_eq!(req.temperature, 0.7);

        let req = req.with_max_tokens(100).with_temperature(0.2);
        assert_eq!(req.max_tokens, 100);
        assert_eq!(req.temperature, 0.2);
    }

    #[test]
    fn retryable_errors() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::Transport("reset".into()).is_retryable());
        for status in [429, 500, 502, 503] {
            let err = ProviderError::Status {
                status,
                body: String::new(),
            };
            assert!(err.is_retryable(), "status {status}");
        }

        for err in [
            ProviderError::NotConfigured,
            ProviderError::EmptyResponse,
            ProviderError::InvalidResponse("no choices".into()),
            ProviderError::Status {
                status: 401,
                body: "bad key".into(),
            },
            ProviderError::Status {
                status: 400,
                body: String::new(),
            },
        ] {
            assert!(!err.is_retryable(), "{err}");
        }
    }
}
