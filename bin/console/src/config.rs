//! Console configuration.
//!
//! Loaded via the `config` crate from `DEAL_DESK_*` environment variables,
//! with `__` separating nested keys:
//!
//! - `DEAL_DESK_BACKEND__BASE_URL`
//! - `DEAL_DESK_BACKEND__API_KEY`
//! - `DEAL_DESK_BACKEND__TIMEOUT_SECONDS`

use deal_desk_gateway::GatewayConfig;
use serde::Deserialize;

const ENV_PREFIX: &str = "DEAL_DESK";

/// Console configuration composed from library configs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsoleConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub backend: GatewayConfig,
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(None)
    }

    fn load(vars: Option<config::Map<String, String>>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()
    }
}
