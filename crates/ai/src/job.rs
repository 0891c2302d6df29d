use serde::{Deserialize, Serialize};

use scriptaudit_core::{AnalysisId, DomainError, DomainResult};

use crate::normalizer::{Normalized, normalize_detailed};
use crate::prompt::build_analysis_prompt;
use crate::provider::CompletionRequest;
use crate::result::AiError;

/// A script submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub script: String,
    pub model: String,
}

impl AnalysisRequest {
    pub fn new(script: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            model: model.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.script.trim().is_empty() {
            return Err(DomainError::validation("script must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(DomainError::validation("model must not be empty"));
        }
        Ok(())
    }
}

/// One analysis run: a validated request plus the id it is tracked under.
///
/// The job does no I/O. Callers send [`completion_request`](Self::completion_request)
/// to a provider and hand the raw text back to [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct ScriptAnalysisJob {
    id: AnalysisId,
    request: AnalysisRequest,
    max_tokens: u32,
    temperature: f32,
}

impl ScriptAnalysisJob {
    pub fn new(request: AnalysisRequest) -> Result<Self, AiError> {
        request.validate()?;
        Ok(Self {
            id: AnalysisId::new(),
            request,
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
            temperature: CompletionRequest::DEFAULT_TEMPERATURE,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn id(&self) -> AnalysisId {
        self.id
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// The provider call for this job.
    pub fn completion_request(&self) -> CompletionRequest {
        let prompt = build_analysis_prompt(&self.request.script, &self.request.model);
        CompletionRequest::new(self.request.model.clone(), prompt)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }

    /// Normalize the provider's raw text. Never fails.
    pub fn finish(&self, raw: &str) -> Normalized {
        normalize_detailed(raw, &self.request.script)
    }
}
