//! Configuration validation for about-tools.

use super::types::{ApiConfig, AppConfig, GenerationConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.api.validate());
        errors.extend(self.generation.validate());

        if self.generation.fetch_licenses {
            if self.api.url.is_none() {
                errors.push(ConfigError::new(
                    "api.url",
                    "A license API URL is required to fetch licenses",
                ));
            }
            if self.api.key.as_deref().map_or(true, str::is_empty) {
                errors.push(ConfigError::new(
                    "api.key",
                    "A license API key is required to fetch licenses",
                ));
            }
        }

        errors
    }
}

impl Validatable for ApiConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(ConfigError::new(
                    "api.url",
                    format!("URL must start with http:// or https://, got '{url}'"),
                ));
            }
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "api.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }
        errors
    }
}

impl Validatable for GenerationConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref dir) = self.reference_dir {
            if !dir.is_dir() {
                errors.push(ConfigError::new(
                    "generation.reference_dir",
                    format!("Reference directory does not exist: {}", dir.display()),
                ));
            }
        }
        errors
    }
}
