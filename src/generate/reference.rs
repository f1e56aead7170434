//! Reference library: license and notice files from a previous generation.

use crate::error::{AboutError, GenerationErrorKind, Result};
use crate::inventory::is_about_file;
use crate::model::{Diagnostic, License, DEFAULT_LICENSE_URL_BASE};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use walkdir::WalkDir;

const LICENSE_EXTENSION: &str = ".LICENSE";

/// License data stored next to license texts as `<key>.yml`.
#[derive(Debug, Clone, Deserialize)]
struct ReferenceLicenseData {
    key: Option<String>,
    name: Option<String>,
    url: Option<String>,
    file: Option<String>,
}

/// Licenses and notices available for reuse, keyed by license key and by
/// notice file name.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLibrary {
    licenses: IndexMap<String, License>,
    notices: IndexMap<String, String>,
}

impl ReferenceLibrary {
    /// Load every license and notice file under `dir`.
    ///
    /// The walk is sorted and the first file found for a key or name wins.
    /// `.ABOUT` descriptors are ignored.
    pub fn load(dir: &Path) -> Result<(Self, Vec<Diagnostic>)> {
        if !dir.is_dir() {
            return Err(AboutError::generation(
                format!("at {}", dir.display()),
                GenerationErrorKind::ReferenceDirectory("not a directory".to_string()),
            ));
        }

        let mut diagnostics = Vec::new();
        let mut texts: IndexMap<String, String> = IndexMap::new();
        let mut data: IndexMap<String, ReferenceLicenseData> = IndexMap::new();
        let mut notices: IndexMap<String, String> = IndexMap::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                AboutError::generation(
                    format!("walking {}", dir.display()),
                    GenerationErrorKind::ReferenceDirectory(e.to_string()),
                )
            })?;
            if !entry.file_type().is_file() || is_about_file(entry.path()) {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();

            if let Some(stem) = name.strip_suffix(".yml") {
                let text = std::fs::read_to_string(path).map_err(|e| AboutError::io(path, e))?;
                match serde_yaml_ng::from_str::<ReferenceLicenseData>(&text) {
                    Ok(license) => {
                        let key = license.key.clone().unwrap_or_else(|| stem.to_string());
                        data.entry(key).or_insert(license);
                    }
                    Err(e) => diagnostics.push(Diagnostic::error(format!(
                        "Invalid reference license data file: {}: {e}",
                        path.display()
                    ))),
                }
                continue;
            }

            let bytes = std::fs::read(path).map_err(|e| AboutError::io(path, e))?;
            let content = String::from_utf8_lossy(&bytes).into_owned();
            if name.ends_with(LICENSE_EXTENSION) {
                texts.entry(name).or_insert(content);
            } else {
                notices.entry(name).or_insert(content);
            }
        }

        let mut licenses = IndexMap::new();
        for (key, license_data) in data {
            let file = license_data
                .file
                .unwrap_or_else(|| format!("{key}{LICENSE_EXTENSION}"));
            let Some(text) = texts.get(&file) else {
                diagnostics.push(Diagnostic::error(format!(
                    "The reference license: {key} does not have a corresponding text file: {file}"
                )));
                continue;
            };
            let mut license = License::new(key.clone(), DEFAULT_LICENSE_URL_BASE).with_text(text.clone());
            license.name = license_data.name;
            if let Some(url) = license_data.url {
                license.url = url;
            }
            license.file = file;
            licenses.insert(key, license);
        }

        for (file, text) in texts {
            let Some(key) = file.strip_suffix(LICENSE_EXTENSION) else {
                continue;
            };
            if !licenses.contains_key(key) {
                licenses.insert(
                    key.to_string(),
                    License::new(key, DEFAULT_LICENSE_URL_BASE).with_text(text),
                );
            }
        }

        tracing::debug!(
            licenses = licenses.len(),
            notices = notices.len(),
            "Loaded reference library from {}",
            dir.display()
        );

        Ok((Self { licenses, notices }, diagnostics))
    }

    pub fn license(&self, key: &str) -> Option<&License> {
        self.licenses.get(key)
    }

    pub fn notice(&self, file_name: &str) -> Option<&str> {
        self.notices.get(file_name).map(String::as_str)
    }

    pub fn licenses(&self) -> &IndexMap<String, License> {
        &self.licenses
    }

    pub fn notices(&self) -> &IndexMap<String, String> {
        &self.notices
    }
}
