//! Configuration for cors-relay

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RelayError, Result};

/// Main relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream configuration
    pub upstream: UpstreamConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:3210")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Log one line per forwarded request
    #[serde(default = "default_log_requests")]
    pub log_requests: bool,
}

/// Upstream configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL all non-special requests are forwarded to
    /// (e.g., "https://api.example.com")
    pub base_url: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3210".to_string()
}

fn default_log_requests() -> bool {
    true
}

impl RelayConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Create a default development configuration
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: default_listen_addr(),
                log_requests: true,
            },
            upstream: UpstreamConfig {
                base_url: "http://127.0.0.1:8080".to_string(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.upstream.base_url).map_err(|e| {
            RelayError::Config(format!(
                "Invalid upstream URL '{}': {}",
                self.upstream.base_url, e
            ))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(RelayError::Config(format!(
                "Unsupported upstream scheme '{}', expected http or https",
                parsed.scheme()
            )));
        }

        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::development()
    }
}
