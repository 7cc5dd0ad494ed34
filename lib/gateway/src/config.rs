//! Gateway configuration.

use serde::Deserialize;
use std::fmt;

/// Connection settings for the investigation backend.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the backend, without the `/workflow` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request, if set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl GatewayConfig {
    /// Returns a config pointing at `base_url` with default settings.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_config_has_correct_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = GatewayConfig {
            api_key: Some("secret-token".to_string()),
            ..GatewayConfig::default()
        };
        let shown = format!("{config:?}");
        assert!(shown.contains("http://localhost:8000"));
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("secret-token"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"api_key": "k"}"#).expect("deserialize");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }
}
