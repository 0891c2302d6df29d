//! Server configuration.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_bind_addr(std::env::var("BIND_ADDR").ok())
    }

    pub fn from_bind_addr(raw: Option<String>) -> Result<Self, ServerConfigError> {
        let value = raw
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = value
            .parse()
            .map_err(|source| ServerConfigError::BindAddr { value, source })?;
        Ok(Self { bind_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_interfaces() {
        let cfg = ServerConfig::from_bind_addr(None).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn parses_and_rejects() {
        let cfg = ServerConfig::from_bind_addr(Some("127.0.0.1:9000".into())).unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert!(ServerConfig::from_bind_addr(Some("localhost".into())).is_err());
    }
}
