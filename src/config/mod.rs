//! Configuration for about-tools.
//!
//! Settings come from an optional YAML file, discovered in the current
//! directory, the user config directory or the home directory, with command
//! line arguments layered on top.
//!
//! ```yaml
//! api:
//!   url: https://enterprise.dejacode.com/api/v2/licenses/
//!   timeout_secs: 30
//! generation:
//!   reference_dir: ./previous-output
//!   fetch_licenses: true
//! ```
//!
//! ```rust,ignore
//! use about_tools::config::{load_or_default, Validatable};
//!
//! let (config, loaded_from) = load_or_default(None);
//! for error in config.validate() {
//!     eprintln!("{error}");
//! }
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{
    ApiConfig, AppConfig, AppConfigBuilder, GenerationConfig, API_KEY_ENV,
    DEFAULT_API_TIMEOUT_SECS,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and complete `.about-tools.yaml` files.
pub fn generate_json_schema() -> crate::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
