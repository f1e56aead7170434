//! Severity-leveled diagnostics.
//!
//! Every loader, validator and generator in this crate reports expected,
//! recoverable problems as [`Diagnostic`] values instead of returning an
//! error. Callers always receive the full list next to whatever records
//! succeeded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational notice, e.g. a custom field was found
    Info,
    /// Recoverable oddity
    Warning,
    /// A specific row, path or file was skipped; the batch continues
    Error,
    /// The row, file or whole inventory is rejected
    Critical,
}

impl Severity {
    /// Upper-case label used when printing diagnostics
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Whether this severity makes a batch unsuccessful
    pub fn is_failure(self) -> bool {
        self >= Self::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem. Equality and ordering are by `(severity, message)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Remove repeated diagnostics, keeping the first occurrence of each.
pub fn dedupe(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = std::collections::HashSet::with_capacity(diagnostics.len());
    diagnostics
        .into_iter()
        .filter(|d| seen.insert(d.clone()))
        .collect()
}

/// Whether any diagnostic in the slice is CRITICAL
pub fn has_critical(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_critical)
}

/// Highest severity in the slice, if any
pub fn max_severity(diagnostics: &[Diagnostic]) -> Option<Severity> {
    diagnostics.iter().map(|d| d.severity).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
        assert!(!Severity::Warning.is_failure());
        assert!(Severity::Error.is_failure());
    }

    #[test]
    fn test_diagnostic_ordering_by_severity_then_message() {
        let mut items = vec![
            Diagnostic::critical("b"),
            Diagnostic::info("z"),
            Diagnostic::critical("a"),
        ];
        items.sort();
        assert_eq!(
            items,
            vec![
                Diagnostic::info("z"),
                Diagnostic::critical("a"),
                Diagnostic::critical("b"),
            ]
        );
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::critical("Required field \"about_resource\" is missing.");
        assert_eq!(
            d.to_string(),
            "CRITICAL: Required field \"about_resource\" is missing."
        );
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence_order() {
        let items = vec![
            Diagnostic::info("Field foo is a custom field."),
            Diagnostic::error("x"),
            Diagnostic::info("Field foo is a custom field."),
            Diagnostic::warning("x"),
        ];
        let deduped = dedupe(items);
        assert_eq!(
            deduped,
            vec![
                Diagnostic::info("Field foo is a custom field."),
                Diagnostic::error("x"),
                Diagnostic::warning("x"),
            ]
        );
    }

    #[test]
    fn test_max_severity() {
        assert_eq!(max_severity(&[]), None);
        let items = [Diagnostic::info("a"), Diagnostic::error("b")];
        assert_eq!(max_severity(&items), Some(Severity::Error));
        assert!(!has_critical(&items));
    }
}
