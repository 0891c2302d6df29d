//! Infrastructure layer: configuration, provider clients, analysis runner.

pub mod config;
pub mod providers;
pub mod runner;

pub use config::{ConfigError, ProviderConfig};
pub use providers::{CannedProvider, OpenRouterClient, UnconfiguredProvider};
pub use runner::AnalysisRunner;
