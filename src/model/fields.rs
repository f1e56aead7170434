//! Field vocabulary and field-name validation.
//!
//! A field name is *standard* when it belongs to [`STANDARD_FIELDS`]; any
//! other name is *custom*. Both kinds obey the same naming rules: lowercase
//! ASCII, starting with a letter, followed by letters, digits or underscores.

use super::diagnostic::Diagnostic;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Name of the resource field every record needs.
pub const ABOUT_RESOURCE: &str = "about_resource";
/// Name of the descriptor path field.
pub const ABOUT_FILE_PATH: &str = "about_file_path";
pub const LICENSE_EXPRESSION: &str = "license_expression";
pub const LICENSES: &str = "licenses";
pub const NOTICE_FILE: &str = "notice_file";
pub const NOTICE_TEXT: &str = "notice_text";
pub const CHANGELOG_FILE: &str = "changelog_file";
pub const COPYRIGHT: &str = "copyright";

static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("static regex"));

/// How a standard field's value is cleaned and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed free text, possibly multi-line
    Text,
    /// Relative POSIX path, trimmed of whitespace and surrounding slashes
    Path,
    /// Multi-line text with every line trimmed
    Copyright,
    /// Boolean license expression over license keys
    LicenseExpression,
    /// Computed from `license_expression`; never read from input
    Licenses,
    /// yes / no flag
    Flag,
}

/// One entry of the standard vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether the field is written to descriptor files and exports
    pub serialized: bool,
}

const fn field(name: &'static str, kind: FieldKind) -> StandardField {
    StandardField {
        name,
        kind,
        serialized: true,
    }
}

/// The standard vocabulary, in canonical serialization order.
pub const STANDARD_FIELDS: &[StandardField] = &[
    field(ABOUT_RESOURCE, FieldKind::Path),
    field(ABOUT_FILE_PATH, FieldKind::Path),
    field("name", FieldKind::Text),
    field("version", FieldKind::Text),
    field("description", FieldKind::Text),
    field("homepage_url", FieldKind::Text),
    field("download_url", FieldKind::Text),
    field("notes", FieldKind::Text),
    field(LICENSE_EXPRESSION, FieldKind::LicenseExpression),
    field(LICENSES, FieldKind::Licenses),
    field(COPYRIGHT, FieldKind::Copyright),
    field(NOTICE_FILE, FieldKind::Path),
    field("notice_url", FieldKind::Text),
    field(CHANGELOG_FILE, FieldKind::Path),
    field("owner", FieldKind::Text),
    field("owner_url", FieldKind::Text),
    field("contact", FieldKind::Text),
    field("author", FieldKind::Text),
    field("vcs_tool", FieldKind::Text),
    field("vcs_repository", FieldKind::Text),
    field("vcs_path", FieldKind::Text),
    field("vcs_tag", FieldKind::Text),
    field("vcs_branch", FieldKind::Text),
    field("vcs_revision", FieldKind::Text),
    field("vcs_url", FieldKind::Text),
    field("attribute", FieldKind::Flag),
    field("redistribute", FieldKind::Flag),
    field("modified", FieldKind::Flag),
    field("track_changes", FieldKind::Flag),
    field("internal_use_only", FieldKind::Flag),
    field("md5", FieldKind::Text),
    field("sha1", FieldKind::Text),
    field("sha256", FieldKind::Text),
    field("sha512", FieldKind::Text),
    field("spec_version", FieldKind::Text),
    StandardField {
        name: NOTICE_TEXT,
        kind: FieldKind::Text,
        serialized: false,
    },
];

static STANDARD_INDEX: LazyLock<HashMap<&'static str, usize>> = LazyLock::new(|| {
    STANDARD_FIELDS
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name, i))
        .collect()
});

/// Classification of a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Standard,
    Custom,
}

/// Classify a field name as standard or custom.
///
/// Matching is exact: a misspelled or differently-cased standard name is custom.
pub fn classify(name: &str) -> FieldClass {
    if STANDARD_INDEX.contains_key(name) {
        FieldClass::Standard
    } else {
        FieldClass::Custom
    }
}

/// Look up a standard field definition.
pub fn standard_field(name: &str) -> Option<&'static StandardField> {
    STANDARD_INDEX.get(name).map(|&i| &STANDARD_FIELDS[i])
}

/// Validate one field name against the naming rules.
///
/// The lowercase rule and the character rule are checked independently, so a
/// single name can produce two CRITICAL diagnostics.
pub fn validate_name(name: &str) -> Vec<Diagnostic> {
    if name.is_empty() {
        return vec![Diagnostic::critical("Invalid empty field name.")];
    }

    let mut diagnostics = Vec::new();
    if !FIELD_NAME_RE.is_match(name) {
        diagnostics.push(Diagnostic::critical(format!(
            "Field name: '{name}' contains illegal name characters (or empty spaces) and is ignored."
        )));
    }
    if name.chars().any(char::is_uppercase) {
        diagnostics.push(Diagnostic::critical(format!(
            "Field name: '{name}' must be lowercase."
        )));
    }
    diagnostics
}

/// Structural check of an inventory's column names.
///
/// Reports every invalid name, exact duplicates, and (once) names that only
/// differ by case. When `require_about_resource` is set, a missing
/// `about_resource` column is reported too.
pub fn validate_field_names(names: &[String], require_about_resource: bool) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();
    let mut seen_lower = HashSet::new();
    let mut case_collision = false;

    for name in names {
        diagnostics.extend(validate_name(name));
        if !seen.insert(name.as_str()) {
            diagnostics.push(Diagnostic::critical(format!(
                "Duplicated field name: {name}"
            )));
            continue;
        }
        if !seen_lower.insert(name.to_lowercase()) {
            case_collision = true;
        }
    }

    if case_collision {
        diagnostics.push(Diagnostic::critical(
            "Invalid fields: lowercased field names must be unique.",
        ));
    }

    if require_about_resource && !names.iter().any(|n| n == ABOUT_RESOURCE) {
        diagnostics.push(Diagnostic::critical(
            "Required field \"about_resource\" is missing.",
        ));
    }

    diagnostics
}
