//! Configuration file loading and discovery.

use super::types::{AppConfig, DEFAULT_API_TIMEOUT_SECS};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".about-tools.yaml",
    ".about-tools.yml",
    "about-tools.yaml",
    "about-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (`~/.config/about-tools/`)
/// 4. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("about-tools")))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml_ng::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                (config, Some(path))
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Unset values and defaults in `other` leave this config unchanged.
    pub fn merge(&mut self, other: &Self) {
        if other.api.url.is_some() {
            self.api.url.clone_from(&other.api.url);
        }
        if other.api.key.is_some() {
            self.api.key.clone_from(&other.api.key);
        }
        if other.api.timeout_secs != DEFAULT_API_TIMEOUT_SECS {
            self.api.timeout_secs = other.api.timeout_secs;
        }

        if other.generation.reference_dir.is_some() {
            self.generation
                .reference_dir
                .clone_from(&other.generation.reference_dir);
        }
        if other.generation.legacy_placement {
            self.generation.legacy_placement = true;
        }
        if other.generation.fetch_licenses {
            self.generation.fetch_licenses = true;
        }

        if other.transform.is_some() {
            self.transform.clone_from(&other.transform);
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_example_config() -> String {
    r"# about-tools configuration
#
# Place this file at .about-tools.yaml in your project root or at
# ~/.config/about-tools/about-tools.yaml. CLI arguments override file settings.

# License API access
api:
  # url: https://enterprise.dejacode.com/api/v2/licenses/
  # key may also be set with the ABOUT_API_KEY environment variable
  # key: your-api-key
  timeout_secs: 30

# ABOUT file generation
generation:
  # reference_dir: ./previous-output
  legacy_placement: false
  fetch_licenses: false

# Column transformation for the transform command
# transform:
#   column_renamings:
#     'Directory/Location': about_resource
#   kept_columns: [about_resource, name, version, license_expression]
#   required_columns: [name]
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("about-tools.yml");
        std::fs::write(&config_path, "generation:\n  legacy_placement: true\n").unwrap();

        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_dotfile() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("about-tools.yaml"), "").unwrap();
        std::fs::write(tmp.path().join(".about-tools.yaml"), "").unwrap();

        assert_eq!(
            find_config_in_dir(tmp.path()),
            Some(tmp.path().join(".about-tools.yaml"))
        );
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        let yaml = r"
api:
  url: https://example.com/api/v2/licenses/
  timeout_secs: 10
generation:
  fetch_licenses: true
transform:
  required_columns: [name]
";
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(
            config.api.url.as_deref(),
            Some("https://example.com/api/v2/licenses/")
        );
        assert_eq!(config.api.timeout_secs, 10);
        assert!(config.generation.fetch_licenses);
        assert_eq!(
            config.transform.unwrap().required_columns,
            vec!["name".to_string()]
        );
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/about-tools.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_on_broken_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("broken.yaml");
        std::fs::write(&config_path, "api: [not, a, mapping\n").unwrap();

        let (config, loaded_from) = load_or_default(Some(&config_path));
        assert_eq!(config, AppConfig::default());
        assert!(loaded_from.is_none());
    }

    #[test]
    fn test_config_merge() {
        let mut base = AppConfig::builder()
            .api_url("https://file.example.com/api/")
            .api_key("file-key")
            .timeout_secs(10)
            .build();
        let overrides = AppConfig::builder()
            .api_key("cli-key")
            .fetch_licenses(true)
            .build();

        base.merge(&overrides);

        assert_eq!(base.api.url.as_deref(), Some("https://file.example.com/api/"));
        assert_eq!(base.api.key.as_deref(), Some("cli-key"));
        assert_eq!(base.api.timeout_secs, 10);
        assert!(base.generation.fetch_licenses);
    }

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig = serde_yaml_ng::from_str(&generate_example_config()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "api:\n  timeout_secs: 5\n").unwrap();

        assert_eq!(discover_config_file(Some(&config_path)), Some(config_path));
    }
}
