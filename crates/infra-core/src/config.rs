//! Generator configuration.
//!
//! Consumed by `generate_with`. The editor surface may ship it as JSON; every
//! field is optional and falls back to `Default`.

use serde::{Deserialize, Serialize};

/// Value of the `Environment` tag when a resource has none.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Network name used for compute nodes not connected to any network.
pub const PLACEHOLDER_NETWORK: &str = "default-vpc";

/// Configuration for `generate_with`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `Environment` tag written for resources that lack one. Default: **"production"**.
    pub default_environment: String,

    /// Network name embedded in the address of unplaced compute nodes.
    /// Default: **"default-vpc"**.
    pub placeholder_network: String,

    /// Emit tags other than `Name` and `Environment`. Default: **true**.
    pub extra_tags: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
            placeholder_network: PLACEHOLDER_NETWORK.to_string(),
            extra_tags: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config: GeneratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn partial_json_overrides_one_field() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "default_environment": "dev" }"#).unwrap();
        assert_eq!(config.default_environment, "dev");
        assert_eq!(config.placeholder_network, PLACEHOLDER_NETWORK);
        assert!(config.extra_tags);
    }
}
