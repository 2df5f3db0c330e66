//! Configuration loading and management

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::base_url`]
pub const API_URL_ENV: &str = "FITHUB_API_URL";

/// Environment variable overriding [`ClientConfig::auth_token`]
pub const API_TOKEN_ENV: &str = "FITHUB_API_TOKEN";

/// Client configuration
///
/// # Example
///
/// ```yaml
/// base_url: https://gym.example.com
/// api_prefix: /api
/// timeout_secs: 15
/// event_capacity: 256
/// log_filter: fithub=debug
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash
    pub base_url: String,

    /// Path prefix prepended to every endpoint
    pub api_prefix: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Buffer size of the store event bus
    pub event_capacity: usize,

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,

    /// Bearer token attached to every request, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_prefix: "/api".to_string(),
            timeout_secs: 30,
            event_capacity: 1024,
            log_filter: "info".to_string(),
            auth_token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Invalid config file '{}'", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FITHUB_API_URL` / `FITHUB_API_TOKEN` when set
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.auth_token = Some(token);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants the gateway relies on
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            );
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL of an endpoint path such as `/payments/stats`
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", base, path)
        } else {
            format!("{}/{}/{}", base, prefix, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint("/payments"), "http://localhost:8080/api/payments");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ClientConfig::from_yaml_str("base_url: https://gym.example.com/\n").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(
            config.endpoint("payments/stats"),
            "https://gym.example.com/api/payments/stats"
        );
    }

    #[test]
    fn test_empty_prefix() {
        let config = ClientConfig {
            api_prefix: String::new(),
            ..ClientConfig::default()
        };
        assert_eq!(config.endpoint("/staff/3"), "http://localhost:8080/staff/3");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ClientConfig::from_yaml_str("base_url: gym.example.com").is_err());
        assert!(ClientConfig::from_yaml_str("timeout_secs: 0").is_err());
        assert!(ClientConfig::from_yaml_str("timeout_secs: soon").is_err());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::default()
            .with_overrides_from(|key| match key {
                API_URL_ENV => Some("https://override.example.com".to_string()),
                API_TOKEN_ENV => Some(String::new()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.base_url, "https://override.example.com");
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn test_yaml_serialization() {
        let config = ClientConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = ClientConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
