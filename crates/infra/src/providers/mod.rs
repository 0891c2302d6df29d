//! [`CompletionProvider`](scriptaudit_ai::CompletionProvider) implementations.

pub mod canned;
pub mod openrouter;
pub mod unconfigured;

pub use canned::CannedProvider;
pub use openrouter::OpenRouterClient;
pub use unconfigured::UnconfiguredProvider;
