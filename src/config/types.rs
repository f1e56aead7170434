//! Configuration types for about-tools operations.

use crate::inventory::TransformConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default license API request timeout in seconds
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the license API key
pub const API_KEY_ENV: &str = "ABOUT_API_KEY";

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered on top of file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// License API access
    pub api: ApiConfig,
    /// ABOUT file generation
    pub generation: GenerationConfig,
    /// Column transformation applied by the `transform` command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformConfig>,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// License API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    /// License API endpoint, e.g. `https://enterprise.dejacode.com/api/v2/licenses/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// API key sent with every lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenerationConfig {
    /// Directory of previously generated license and notice files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_dir: Option<PathBuf>,
    /// Keep full resource paths and directory-style `about_file_path` values
    pub legacy_placement: bool,
    /// Fetch licenses missing from the reference directory from the license API
    pub fetch_licenses: bool,
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the license API endpoint.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.url = Some(url.into());
        self
    }

    /// Set the license API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api.key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.api.timeout_secs = secs;
        self
    }

    /// Set the reference directory.
    pub fn reference_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.generation.reference_dir = Some(dir.into());
        self
    }

    pub const fn legacy_placement(mut self, enabled: bool) -> Self {
        self.config.generation.legacy_placement = enabled;
        self
    }

    pub const fn fetch_licenses(mut self, enabled: bool) -> Self {
        self.config.generation.fetch_licenses = enabled;
        self
    }

    /// Set the column transformation.
    pub fn transform(mut self, transform: TransformConfig) -> Self {
        self.config.transform = Some(transform);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.url.is_none());
        assert!(!config.generation.fetch_licenses);
        assert!(config.transform.is_none());
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .api_url("https://example.com/api/v2/licenses/")
            .api_key("secret")
            .timeout_secs(5)
            .reference_dir("ref")
            .fetch_licenses(true)
            .build();
        assert_eq!(config.api.key.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.generation.reference_dir, Some(PathBuf::from("ref")));
        assert!(config.generation.fetch_licenses);
        assert!(!config.generation.legacy_placement);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig =
            serde_yaml_ng::from_str("generation:\n  legacy_placement: true\n").unwrap();
        assert!(config.generation.legacy_placement);
        assert_eq!(config.api.timeout_secs, DEFAULT_API_TIMEOUT_SECS);
    }
}
