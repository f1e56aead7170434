//! In-memory model of attribution metadata.
//!
//! An [`About`] record describes one component: its resource path, standard
//! fields such as `name` or `license_expression`, any custom fields, and the
//! [`License`] entries resolved from its license expression. Problems found
//! while building records are reported as [`Diagnostic`] values.

mod about;
pub mod descriptor;
mod diagnostic;
pub mod fields;
mod license;

pub use about::{strip_about_extension, About, FieldValue, ResourcePolicy};
pub use diagnostic::{dedupe, has_critical, max_severity, Diagnostic, Severity};
pub use fields::{classify, validate_field_names, validate_name, FieldClass, FieldKind};
pub use license::{license_url, License, LicenseExpression, DEFAULT_LICENSE_URL_BASE};
