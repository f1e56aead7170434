//! Safe output path planning for descriptor files.
//!
//! Paths are planned from the raw inventory values so that surrounding
//! whitespace in a path segment is still visible to the checks.

use crate::model::Diagnostic;
use std::collections::HashSet;

const ILLEGAL_SEGMENT_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Last non-empty segment of a POSIX path, or the path itself for `.`.
pub fn resource_name(path: &str) -> &str {
    path.trim()
        .trim_matches('/')
        .rsplit('/')
        .find(|seg| !seg.is_empty())
        .unwrap_or(".")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|seg| !seg.is_empty())
}

/// Check the segments of a path that will be created under the target directory.
fn check_segments(path: &str) -> Result<(), Diagnostic> {
    for seg in segments(path) {
        if seg != seg.trim() {
            return Err(Diagnostic::error(format!(
                "Skipping invalid path to create an ABOUT file: a path segment \
                 cannot start or end with a space: \"{path}\""
            )));
        }
        if seg == ".." {
            return Err(Diagnostic::error(format!(
                "Skipping invalid path to create an ABOUT file: a path segment \
                 cannot be \"..\": \"{path}\""
            )));
        }
        if seg
            .chars()
            .any(|c| ILLEGAL_SEGMENT_CHARS.contains(&c) || c.is_control())
        {
            return Err(Diagnostic::error(format!(
                "Skipping invalid path to create an ABOUT file: a path segment \
                 contains illegal characters: \"{path}\""
            )));
        }
    }
    Ok(())
}

/// Plans descriptor paths for a batch, rejecting unsafe or colliding ones.
#[derive(Debug, Default)]
pub struct PathPlanner {
    legacy_placement: bool,
    seen: HashSet<String>,
}

/// A planned descriptor location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPath {
    /// Descriptor path relative to the target directory, ending in `.ABOUT`
    pub about_file_path: String,
    /// Value to store as `about_resource` in the written descriptor
    pub about_resource: String,
}

impl PathPlanner {
    pub fn new(legacy_placement: bool) -> Self {
        Self {
            legacy_placement,
            seen: HashSet::new(),
        }
    }

    /// Plan the descriptor path of one record from its raw
    /// `about_resource` and optional `about_file_path` values.
    ///
    /// Returns exactly one ERROR diagnostic when the record must be skipped.
    pub fn plan(
        &mut self,
        about_resource: &str,
        about_file_path: Option<&str>,
    ) -> Result<PlannedPath, Diagnostic> {
        let about_file_path = about_file_path.filter(|p| !p.trim().is_empty());

        if about_resource.contains('\\') {
            return Err(Diagnostic::error(format!(
                "Skipping invalid \"about_resource\". Path must be a POSIX path \
                 using \"/\" (slash) as separator: \"{about_resource}\""
            )));
        }
        if let Some(afp) = about_file_path {
            if afp.contains('\\') {
                return Err(Diagnostic::error(format!(
                    "Skipping invalid \"about_file_path\". Path must be a POSIX path \
                     using \"/\" (slash) as separator: \"{afp}\""
                )));
            }
        }
        if about_file_path.is_none() && about_resource.trim() == "." {
            return Err(Diagnostic::error(
                "Skipping invalid \"about_resource\". Path cannot be a single \".\" \
                 (period) without an \"about_file_path\"",
            ));
        }

        check_segments(about_resource)?;
        if let Some(afp) = about_file_path {
            check_segments(afp)?;
        }

        let file_name = resource_name(about_resource);
        let mut planned = match about_file_path {
            Some(afp) => {
                let cleaned = afp.trim().trim_matches('/');
                if self.legacy_placement && afp.trim_end().ends_with('/') {
                    join_segments([cleaned, file_name])
                } else {
                    join_segments([cleaned])
                }
            }
            None => join_segments([about_resource.trim()]),
        };

        if !planned.to_lowercase().ends_with(".about") {
            planned.push_str(".ABOUT");
        }
        if resource_name(&planned).eq_ignore_ascii_case(".ABOUT") {
            return Err(Diagnostic::error(format!(
                "Skipping invalid path to create an ABOUT file: the file name \
                 cannot be empty: \"{}\"",
                about_file_path.unwrap_or(about_resource)
            )));
        }

        if !self.seen.insert(planned.to_lowercase()) {
            return Err(Diagnostic::error(format!(
                "Skipping duplicated path to create an ABOUT file: \"{planned}\""
            )));
        }

        let about_resource = if self.legacy_placement {
            about_resource.trim().trim_matches('/').to_string()
        } else {
            file_name.to_string()
        };

        Ok(PlannedPath {
            about_file_path: planned,
            about_resource,
        })
    }
}

fn join_segments<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .flat_map(segments)
        .filter(|seg| *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}
