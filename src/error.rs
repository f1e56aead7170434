//! Unified error types for about-tools.
//!
//! Validation problems found in inventories and ABOUT files are never
//! reported through these types: they are collected as
//! [`Diagnostic`](crate::model::Diagnostic) values and returned next to the
//! records. [`AboutError`] is reserved for failures outside the domain, such
//! as an unreadable inventory or an unwritable target directory, that abort
//! the whole operation.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for about-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AboutError {
    /// Errors while reading an inventory
    #[error("Failed to read inventory: {context}")]
    Inventory {
        context: String,
        #[source]
        source: InventoryErrorKind,
    },

    /// Errors while generating ABOUT files
    #[error("Generation failed: {context}")]
    Generation {
        context: String,
        #[source]
        source: GenerationErrorKind,
    },

    /// Errors while talking to the license API
    #[error("License retrieval failed: {context}")]
    LicenseApi {
        context: String,
        #[source]
        source: LicenseApiErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific inventory error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InventoryErrorKind {
    #[error("Unsupported inventory file type: {0}. Must be one of .csv or .json")]
    UnsupportedType(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    #[error("Invalid inventory structure: {0}")]
    InvalidStructure(String),
}

/// Specific generation error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GenerationErrorKind {
    #[error("Target directory is not usable: {0}")]
    TargetDirectory(String),

    #[error("Reference directory is not usable: {0}")]
    ReferenceDirectory(String),
}

/// Specific license API error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LicenseApiErrorKind {
    #[error("Network error: {0}")]
    NetworkError(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for about-tools operations
pub type Result<T> = std::result::Result<T, AboutError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl AboutError {
    /// Create an inventory error with context
    pub fn inventory(context: impl Into<String>, source: InventoryErrorKind) -> Self {
        Self::Inventory {
            context: context.into(),
            source,
        }
    }

    /// Create an inventory error for an unsupported file extension
    pub fn unsupported_inventory(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::inventory(
            format!("at {}", path.display()),
            InventoryErrorKind::UnsupportedType(path.display().to_string()),
        )
    }

    /// Create a generation error with context
    pub fn generation(context: impl Into<String>, source: GenerationErrorKind) -> Self {
        Self::Generation {
            context: context.into(),
            source,
        }
    }

    /// Create a license API error with context
    pub fn license_api(context: impl Into<String>, source: LicenseApiErrorKind) -> Self {
        Self::LicenseApi {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for AboutError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AboutError {
    fn from(err: serde_json::Error) -> Self {
        Self::inventory(
            "JSON deserialization",
            InventoryErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<csv::Error> for AboutError {
    fn from(err: csv::Error) -> Self {
        Self::inventory(
            "CSV deserialization",
            InventoryErrorKind::InvalidCsv(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, creating
/// a chain that shows the path through the code.
///
/// ```ignore
/// use about_tools::error::ErrorContext;
///
/// let text = std::fs::read_to_string(&path)
///     .with_context(|| format!("reading inventory {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<AboutError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: AboutError, new_ctx: &str) -> AboutError {
    match err {
        AboutError::Inventory {
            context: existing,
            source,
        } => AboutError::Inventory {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AboutError::Generation {
            context: existing,
            source,
        } => AboutError::Generation {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AboutError::LicenseApi {
            context: existing,
            source,
        } => AboutError::LicenseApi {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AboutError::Io {
            path,
            message,
            source,
        } => AboutError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        AboutError::Config(msg) => AboutError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
