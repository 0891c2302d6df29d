//! Provider configuration, read from the environment once at startup.

use std::time::Duration;

use thiserror::Error;

use scriptaudit_ai::CompletionRequest;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// `None` means no provider is configured.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Sent as `HTTP-Referer`.
    pub app_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
            temperature: CompletionRequest::DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout_secs = parse_or(get("PROVIDER_TIMEOUT_SECS"), "PROVIDER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "PROVIDER_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let temperature: f32 = parse_or(get("PROVIDER_TEMPERATURE"), "PROVIDER_TEMPERATURE", defaults.temperature)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                key: "PROVIDER_TEMPERATURE",
                value: temperature.to_string(),
                reason: "must be between 0 and 2".to_string(),
            });
        }

        Ok(Self {
            api_key: get("OPENROUTER_API_KEY"),
            base_url: get("OPENROUTER_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            app_url: get("APP_URL").unwrap_or(defaults.app_url),
            timeout: Duration::from_secs(timeout_secs),
            max_tokens: parse_or(get("PROVIDER_MAX_TOKENS"), "PROVIDER_MAX_TOKENS", defaults.max_tokens)?,
            temperature,
            max_retries: parse_or(get("PROVIDER_MAX_RETRIES"), "PROVIDER_MAX_RETRIES", defaults.max_retries)?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = ProviderConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ProviderConfig::default());
        assert!(!cfg.is_configured());
        assert_eq!(cfg.timeout, Duration::from_secs(60));
        assert_eq!(cfg.max_tokens, 4000);
        assert_eq!(cfg.max_retries, 2);
    }

    #[test]
    fn reads_every_key() {
        let cfg = ProviderConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_BASE_URL", "http://127.0.0.1:9000/v1/"),
            ("APP_URL", "https://auditor.example"),
            ("PROVIDER_TIMEOUT_SECS", "5"),
            ("PROVIDER_MAX_TOKENS", "1500"),
            ("PROVIDER_TEMPERATURE", "0.2"),
            ("PROVIDER_MAX_RETRIES", "0"),
        ]))
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(cfg.app_url, "https://auditor.example");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.max_tokens, 1500);
        assert_eq!(cfg.temperature, 0.2);
        assert_eq!(cfg.max_retries, 0);
    }

    #[test]
    fn blank_api_key_is_unset() {
        let cfg = ProviderConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "  ")])).unwrap();
        assert!(!cfg.is_configured());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = ProviderConfig::from_lookup(lookup(&[("PROVIDER_MAX_TOKENS", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "PROVIDER_MAX_TOKENS", .. }
        ));

        let err = ProviderConfig::from_lookup(lookup(&[("PROVIDER_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "PROVIDER_TIMEOUT_SECS", .. }
        ));

        let err = ProviderConfig::from_lookup(lookup(&[("PROVIDER_TEMPERATURE", "3.5")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "PROVIDER_TEMPERATURE", .. }
        ));
    }
}
