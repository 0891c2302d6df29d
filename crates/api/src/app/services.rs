//! Service wiring: which provider answers, and how requests are run.

use std::sync::Arc;

use tracing::{info, warn};

use scriptaudit_ai::{AiError, AnalysisRequest, CompletionProvider, Normalized, ScriptAnalysisJob};
use scriptaudit_core::AnalysisId;
use scriptaudit_infra::{AnalysisRunner, OpenRouterClient, ProviderConfig, UnconfiguredProvider};

#[derive(Clone)]
pub struct AppServices {
    provider: Arc<dyn CompletionProvider>,
    runner: AnalysisRunner,
    max_tokens: u32,
    temperature: f32,
}

impl AppServices {
    pub fn new(provider: Arc<dyn CompletionProvider>, runner: AnalysisRunner) -> Self {
        let defaults = ProviderConfig::default();
        Self {
            provider,
            runner,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }

    /// OpenRouter when an API key is configured, otherwise a provider that
    /// answers every request with "not configured".
    pub fn from_config(config: &ProviderConfig) -> Self {
        let provider: Arc<dyn CompletionProvider> = match OpenRouterClient::new(config) {
            Ok(client) => {
                info!(endpoint = client.endpoint(), "using OpenRouter provider");
                Arc::new(client)
            }
            Err(e) => {
                warn!(error = %e, "OPENROUTER_API_KEY not set or client unavailable; analysis requests will fail");
                Arc::new(UnconfiguredProvider)
            }
        };

        Self {
            provider,
            runner: AnalysisRunner::from_config(config),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<(AnalysisId, Normalized), AiError> {
        let job = ScriptAnalysisJob::new(request)?
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let normalized = self.runner.run(self.provider.as_ref(), &job).await?;
        Ok((job.id(), normalized))
    }
}
