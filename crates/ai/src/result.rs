use thiserror::Error;

use scriptaudit_core::DomainError;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid job input: {0}")]
    InvalidInput(String),

    #[error("provider failed: {0}")]
    Provider(#[from] ProviderError),
}

impl From<DomainError> for AiError {
    fn from(err: DomainError) -> Self {
        AiError::InvalidInput(err.to_string())
    }
}
