use async_trait::async_trait;

use scriptaudit_ai::{CompletionProvider, CompletionRequest, ProviderError};

/// Stands in when no API key is set; every call fails with `NotConfigured`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredProvider;

#[async_trait]
impl CompletionProvider for UnconfiguredProvider {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
        Err(ProviderError::NotConfigured)
    }
}
