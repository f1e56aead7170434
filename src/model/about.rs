//! The About record: one component's attribution metadata.

use super::descriptor;
use super::diagnostic::{has_critical, Diagnostic};
use super::fields::{
    classify, standard_field, validate_name, FieldClass, FieldKind, ABOUT_FILE_PATH, ABOUT_RESOURCE, CHANGELOG_FILE,
    LICENSES, LICENSE_EXPRESSION, NOTICE_FILE, NOTICE_TEXT, STANDARD_FIELDS,
};
use super::license::{License, LicenseExpression, DEFAULT_LICENSE_URL_BASE};
use crate::error::{AboutError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A serialized field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Licenses(Vec<License>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Licenses(_) => None,
        }
    }
}

/// How a missing `about_resource` is handled when building a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePolicy {
    /// A missing or blank `about_resource` is CRITICAL
    Required,
    /// A missing `about_resource` is resolved from the descriptor file name
    /// by dropping its `.ABOUT` extension
    FromDescriptorName(String),
}

/// One component's metadata.
#[derive(Debug, Clone, Default)]
pub struct About {
    standard: IndexMap<String, String>,
    custom: IndexMap<String, String>,
    licenses: Vec<License>,
    location: Option<PathBuf>,
}

impl PartialEq for About {
    fn eq(&self, other: &Self) -> bool {
        self.standard == other.standard
            && self.custom == other.custom
            && self.licenses == other.licenses
    }
}

const FLAG_TRUE: &[&str] = &["yes", "y", "true", "x"];
const FLAG_FALSE: &[&str] = &["no", "n", "false"];

fn clean_value(kind: FieldKind, raw: &str) -> String {
    let raw = raw.replace("\r\n", "\n").replace('\r', "\n");
    match kind {
        FieldKind::Path => raw.trim().trim_matches('/').to_string(),
        FieldKind::Copyright => raw
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        _ => raw.trim().to_string(),
    }
}

impl About {
    /// Create a record for a resource, with no other fields.
    pub fn new(about_resource: impl Into<String>) -> Self {
        let mut about = Self::default();
        about
            .standard
            .insert(ABOUT_RESOURCE.to_string(), about_resource.into());
        about
    }

    /// Build a record from an ordered field mapping.
    ///
    /// Every field name is validated. Custom fields are kept and each one is
    /// reported with an INFO diagnostic. Any CRITICAL diagnostic voids the
    /// record and `None` is returned.
    pub fn from_mapping(
        fields: &IndexMap<String, String>,
        policy: &ResourcePolicy,
    ) -> (Option<Self>, Vec<Diagnostic>) {
        let mut about = Self::default();
        let mut diagnostics = Vec::new();

        for (name, raw) in fields {
            let name_errors = validate_name(name);
            if !name_errors.is_empty() {
                diagnostics.extend(name_errors);
                continue;
            }

            let Some(def) = standard_field(name) else {
                diagnostics.push(Diagnostic::info(format!("Field {name} is a custom field.")));
                let value = clean_value(FieldKind::Text, raw);
                if !value.is_empty() {
                    about.custom.insert(name.clone(), value);
                }
                continue;
            };

            let value = clean_value(def.kind, raw);
            if value.is_empty() {
                continue;
            }

            match def.kind {
                FieldKind::Licenses => diagnostics.push(Diagnostic::warning(
                    "Field licenses is computed from license_expression and is ignored.",
                )),
                FieldKind::Flag => {
                    let lower = value.to_lowercase();
                    if FLAG_TRUE.contains(&lower.as_str()) {
                        about.standard.insert(name.clone(), "yes".to_string());
                    } else if FLAG_FALSE.contains(&lower.as_str()) {
                        about.standard.insert(name.clone(), "no".to_string());
                    } else {
                        diagnostics.push(Diagnostic::critical(format!(
                            "Field name: '{name}' has an invalid flag value: '{value}': \
                             should be one of yes or no or true or false."
                        )));
                    }
                }
                FieldKind::LicenseExpression => {
                    let parsed = LicenseExpression::parse(&value);
                    if let Some(reason) = &parsed.error {
                        diagnostics.push(Diagnostic::error(format!(
                            "Invalid license_expression: '{value}': {reason}"
                        )));
                    }
                    about.licenses = parsed
                        .keys
                        .iter()
                        .map(|key| License::new(key.clone(), DEFAULT_LICENSE_URL_BASE))
                        .collect();
                    about.standard.insert(name.clone(), parsed.expression);
                }
                FieldKind::Text | FieldKind::Path | FieldKind::Copyright => {
                    about.standard.insert(name.clone(), value);
                }
            }
        }

        if about.about_resource().is_none() {
            match policy {
                ResourcePolicy::Required => diagnostics.push(Diagnostic::critical(
                    "Field about_resource is required and empty or missing.",
                )),
                ResourcePolicy::FromDescriptorName(file_name) => {
                    let resource = strip_about_extension(file_name);
                    if resource.is_empty() {
                        diagnostics.push(Diagnostic::critical(
                            "Field about_resource is required and empty or missing.",
                        ));
                    } else {
                        diagnostics.push(Diagnostic::info(format!(
                            "Field about_resource is missing: resolved to \"{resource}\" from the file name."
                        )));
                        about.set(ABOUT_RESOURCE, resource);
                    }
                }
            }
        }

        if has_critical(&diagnostics) {
            (None, diagnostics)
        } else {
            (Some(about), diagnostics)
        }
    }

    /// Load a descriptor file, requiring `about_resource`.
    pub fn load(path: &Path) -> Result<(Option<Self>, Vec<Diagnostic>)> {
        Self::load_with(path, &ResourcePolicy::Required)
    }

    /// Load a descriptor file with an explicit resource policy.
    ///
    /// Malformed content is reported as CRITICAL; only I/O failures are errors.
    pub fn load_with(
        path: &Path,
        policy: &ResourcePolicy,
    ) -> Result<(Option<Self>, Vec<Diagnostic>)> {
        let bytes = std::fs::read(path).map_err(|e| AboutError::io(path, e))?;
        let Ok(text) = String::from_utf8(bytes) else {
            return Ok((
                None,
                vec![Diagnostic::critical(format!(
                    "Cannot load invalid ABOUT file: \"{}\": invalid UTF-8 content",
                    path.display()
                ))],
            ));
        };

        let fields = match descriptor::parse(&text) {
            Ok(fields) => fields,
            Err(errors) => {
                let diagnostics = errors
                    .into_iter()
                    .map(|d| {
                        Diagnostic::new(
                            d.severity,
                            format!(
                                "Cannot load invalid ABOUT file: \"{}\": {}",
                                path.display(),
                                d.message
                            ),
                        )
                    })
                    .collect();
                return Ok((None, diagnostics));
            }
        };

        let (about, diagnostics) = Self::from_mapping(&fields, policy);
        Ok((
            about.map(|mut a| {
                a.location = Some(path.to_path_buf());
                a
            }),
            diagnostics,
        ))
    }

    /// Canonical serialization.
    ///
    /// `about_resource` comes first, then `about_file_path` when `with_path`
    /// is set, then the other standard fields in canonical order (`licenses`
    /// right after `license_expression`), then custom fields in first-seen order.
    pub fn to_dict(&self, with_path: bool) -> IndexMap<String, FieldValue> {
        let mut out = IndexMap::new();
        for def in STANDARD_FIELDS {
            if !def.serialized || (def.name == ABOUT_FILE_PATH && !with_path) {
                continue;
            }
            if def.name == LICENSES {
                if !self.licenses.is_empty() {
                    out.insert(
                        LICENSES.to_string(),
                        FieldValue::Licenses(self.licenses.clone()),
                    );
                }
                continue;
            }
            if let Some(value) = self.standard.get(def.name) {
                out.insert(def.name.to_string(), FieldValue::Text(value.clone()));
            }
        }
        for (name, value) in &self.custom {
            out.insert(name.clone(), FieldValue::Text(value.clone()));
        }
        out
    }

    /// Render the record as descriptor text.
    pub fn dumps(&self) -> String {
        let dict = self.to_dict(false);
        descriptor::dump(
            dict.iter()
                .filter_map(|(k, v)| v.as_text().map(|text| (k.as_str(), text))),
        )
    }

    /// Write the record as a descriptor file, creating parent directories.
    pub fn dump(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AboutError::io(parent, e))?;
        }
        std::fs::write(path, self.dumps()).map_err(|e| AboutError::io(path, e))
    }

    /// Report every referenced file that does not exist under `base_dir`.
    pub fn check_files(&self, base_dir: &Path) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut check = |field: &str, rel: &str| {
            let path = base_dir.join(rel);
            if !path.exists() {
                diagnostics.push(Diagnostic::error(format!(
                    "Field {field}: Path {} not found",
                    path.display()
                )));
            }
        };

        for name in [ABOUT_RESOURCE, NOTICE_FILE, CHANGELOG_FILE] {
            if let Some(rel) = self.get(name) {
                check(name, rel);
            }
        }
        for license in &self.licenses {
            check("license_file", &license.file);
        }
        diagnostics
    }

    /// Load notice and license texts from files next to the descriptor.
    ///
    /// Invalid UTF-8 is replaced; unreadable files are reported as ERROR.
    pub fn load_files(&mut self, base_dir: &Path) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut read = |field: &str, rel: &str| -> Option<String> {
            let path = base_dir.join(rel);
            match std::fs::read(&path) {
                Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    diagnostics.push(Diagnostic::error(format!(
                        "Field {field}: Unable to read file: {}: {e}",
                        path.display()
                    )));
                    None
                }
            }
        };

        if let Some(notice_file) = self.get(NOTICE_FILE).map(str::to_string) {
            if let Some(text) = read(NOTICE_FILE, &notice_file) {
                self.standard.insert(NOTICE_TEXT.to_string(), text);
            }
        }
        for license in &mut self.licenses {
            if let Some(text) = read("license_file", &license.file) {
                license.text = Some(text);
            }
        }
        diagnostics
    }

    pub fn about_resource(&self) -> Option<&str> {
        self.get(ABOUT_RESOURCE)
    }

    pub fn about_file_path(&self) -> Option<&str> {
        self.get(ABOUT_FILE_PATH)
    }

    pub fn license_expression(&self) -> Option<&str> {
        self.get(LICENSE_EXPRESSION)
    }

    pub fn notice_file(&self) -> Option<&str> {
        self.get(NOTICE_FILE)
    }

    pub fn notice_text(&self) -> Option<&str> {
        self.get(NOTICE_TEXT)
    }

    /// Value of a standard or custom text field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.standard
            .get(name)
            .or_else(|| self.custom.get(name))
            .map(String::as_str)
    }

    /// Set a standard or custom text field.
    ///
    /// `license_expression` also recomputes the license list.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == LICENSE_EXPRESSION {
            let parsed = LicenseExpression::parse(&value);
            self.licenses = parsed
                .keys
                .iter()
                .map(|key| License::new(key.clone(), DEFAULT_LICENSE_URL_BASE))
                .collect();
            self.standard.insert(name.to_string(), parsed.expression);
        } else if classify(name) == FieldClass::Standard {
            self.standard.insert(name.to_string(), value);
        } else {
            self.custom.insert(name.to_string(), value);
        }
    }

    pub fn custom_fields(&self) -> &IndexMap<String, String> {
        &self.custom
    }

    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    pub fn licenses_mut(&mut self) -> &mut Vec<License> {
        &mut self.licenses
    }

    /// Where the backing descriptor file lives, once loaded or generated
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: impl Into<PathBuf>) {
        self.location = Some(location.into());
    }
}

/// Drop a trailing case-insensitive `.ABOUT` extension from a file name.
pub fn strip_about_extension(file_name: &str) -> &str {
    let len = file_name.len();
    if len > 6 && file_name.is_char_boundary(len - 6) {
        let (stem, ext) = file_name.split_at(len - 6);
        if ext.eq_ignore_ascii_case(".about") {
            return stem;
        }
    }
    file_name
}
