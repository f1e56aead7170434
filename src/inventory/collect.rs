//! Discovery of existing descriptor files on disk.

use crate::error::{AboutError, Result};
use crate::model::fields::ABOUT_FILE_PATH;
use crate::model::{dedupe, About, Diagnostic, ResourcePolicy};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for [`collect_inventory_with`].
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Report referenced files that do not exist next to each descriptor
    pub check_files: bool,
}

/// Whether `path` names a descriptor file: a case-insensitive `.about`
/// extension with a non-empty base name.
pub fn is_about_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_lowercase)
        .is_some_and(|name| name.ends_with(".about") && name != ".about")
}

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ')
}

/// Check descriptor file names before loading.
///
/// Reports CRITICAL for illegal characters in a file name and for two files
/// in one directory whose names only differ by case.
pub fn check_file_names(paths: &[PathBuf]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut by_lower: HashMap<(PathBuf, String), &Path> = HashMap::new();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut invalid = String::new();
        for c in name.chars().filter(|c| !is_valid_name_char(*c)) {
            if !invalid.contains(c) {
                invalid.push(c);
            }
        }
        if !invalid.is_empty() {
            diagnostics.push(Diagnostic::critical(format!(
                "Invalid characters '{invalid}' in file name at: '{}'",
                path.display()
            )));
        }

        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if let Some(previous) = by_lower.insert((parent, name.to_lowercase()), path) {
            diagnostics.push(Diagnostic::critical(format!(
                "Duplicate files: '{}' and '{}' have the same case-insensitive file name",
                previous.display(),
                path.display()
            )));
        }
    }
    diagnostics
}

fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collect every descriptor file under `location` (or `location` itself).
pub fn collect_inventory(location: &Path) -> Result<(Vec<Diagnostic>, Vec<About>)> {
    collect_inventory_with(location, &CollectOptions::default())
}

/// Collect descriptor files with explicit options.
///
/// A single file is loaded with its `about_resource` resolved from the file
/// name when missing. In a directory every descriptor requires one.
pub fn collect_inventory_with(
    location: &Path,
    options: &CollectOptions,
) -> Result<(Vec<Diagnostic>, Vec<About>)> {
    let metadata = std::fs::metadata(location).map_err(|e| AboutError::io(location, e))?;
    let single_file = metadata.is_file();

    let paths: Vec<PathBuf> = if single_file {
        vec![location.to_path_buf()]
    } else {
        WalkDir::new(location)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file() && is_about_file(entry.path()))
            .map(walkdir::DirEntry::into_path)
            .collect()
    };
    tracing::debug!(
        location = %location.display(),
        count = paths.len(),
        "Discovered descriptor files"
    );

    let name_errors = check_file_names(&paths);
    if !name_errors.is_empty() {
        return Ok((name_errors, Vec::new()));
    }

    let mut diagnostics = Vec::new();
    let mut records = Vec::with_capacity(paths.len());

    for path in &paths {
        let (about_file_path, policy) = if single_file {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name.clone(), ResourcePolicy::FromDescriptorName(name))
        } else {
            let relative = path.strip_prefix(location).unwrap_or(path);
            (to_posix(relative), ResourcePolicy::Required)
        };

        let (about, file_diagnostics) = About::load_with(path, &policy)?;
        diagnostics.extend(file_diagnostics);
        let Some(mut about) = about else {
            continue;
        };
        about.set(ABOUT_FILE_PATH, about_file_path);

        if options.check_files {
            let base_dir = path.parent().unwrap_or(location);
            diagnostics.extend(about.check_files(base_dir));
        }
        records.push(about);
    }

    Ok((dedupe(diagnostics), records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_about_file() {
        assert!(is_about_file(Path::new("lib.zip.ABOUT")));
        assert!(is_about_file(Path::new("dir/x.about")));
        assert!(is_about_file(Path::new("x.AbOuT")));
        assert!(!is_about_file(Path::new(".ABOUT")));
        assert!(!is_about_file(Path::new("dir/.about")));
        assert!(!is_about_file(Path::new("x.ABOUT.txt")));
    }

    #[test]
    fn test_check_file_names_invalid_characters() {
        let diags = check_file_names(&[PathBuf::from("dir/a$b%$.ABOUT")]);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.starts_with("Invalid characters '$%' in file name at:"));
    }

    #[test]
    fn test_check_file_names_case_duplicates() {
        let diags = check_file_names(&[
            PathBuf::from("dir/x.ABOUT"),
            PathBuf::from("dir/X.about"),
            PathBuf::from("other/x.ABOUT"),
        ]);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.starts_with("Duplicate files:"));
    }

    #[test]
    fn test_collect_single_file_resolves_resource() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.zip.ABOUT");
        std::fs::write(&path, "name: lib\n").unwrap();

        let (_, records) = collect_inventory(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].about_resource(), Some("lib.zip"));
        assert_eq!(records[0].about_file_path(), Some("lib.zip.ABOUT"));
    }

    #[test]
    fn test_collect_missing_location_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_inventory(&dir.path().join("nope")).is_err());
    }
}
