//! Client configuration

use std::time::Duration;

use backon::ExponentialBuilder;
use lockbridge_attest::RootByteOrder;
use serde::{Deserialize, Serialize};

/// Backoff for feed requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    pub max_times: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_times: 3,
            min_delay_ms: 250,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_max_times(self.max_times)
            .with_min_delay(Duration::from_millis(self.min_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_jitter()
    }
}

/// Bridge API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL of the bridge API (e.g., "http://localhost:8080")
    pub base_url: String,
    /// Bearer token, if the API requires one
    pub api_key: Option<String>,
    /// Byte order of committed roots served by this deployment
    pub root_byte_order: RootByteOrder,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lockbridge.network".to_string(),
            api_key: None,
            root_byte_order: RootByteOrder::Canonical,
            poll_interval_ms: 12_000,
            request_timeout_ms: 10_000,
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a config for local development
    pub fn local() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            poll_interval_ms: 1_000,
            retry: RetryConfig {
                max_times: 1,
                min_delay_ms: 50,
                max_delay_ms: 200,
            },
            ..Self::default()
        }
    }

    /// Create a config for testnet
    pub fn testnet() -> Self {
        Self {
            base_url: "https://api-testnet.lockbridge.network".to_string(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"baseUrl":"http://bridge:9000","rootByteOrder":"legacyReversed"}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://bridge:9000");
        assert_eq!(config.root_byte_order, RootByteOrder::LegacyReversed);
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(ClientConfig::local().base_url, "http://localhost:8080");
        assert_ne!(ClientConfig::testnet().base_url, ClientConfig::default().base_url);
        assert_eq!(
            ClientConfig::local().with_api_key("k").api_key.as_deref(),
            Some("k")
        );
    }
}
