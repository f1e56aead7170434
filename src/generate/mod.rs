//! Generation of descriptor files from an inventory.
//!
//! Each inventory row becomes one `.ABOUT` file under the target directory,
//! with its `.LICENSE` and `.NOTICE` files written next to it. License texts
//! come first from an optional reference directory (usually the output of a
//! previous run) and then from a [`LicenseProvider`]. Generation is
//! partial-success: a record that cannot be placed is reported and skipped,
//! the rest of the batch is still written.
//!
//! Files whose content is already up to date are left untouched, so running
//! a generation again against its own output is a no-op.

pub mod paths;
mod reference;
mod stats;

pub use paths::{resource_name, PathPlanner, PlannedPath};
pub use reference::ReferenceLibrary;
pub use stats::GenerationStats;

use crate::error::{AboutError, GenerationErrorKind, Result};
use crate::inventory::{load_inventory_with, LoadOptions, RawInventory};
use crate::license::{LicenseProvider, NoOpProvider};
use crate::model::fields::NOTICE_FILE;
use crate::model::{dedupe, About, Diagnostic, License};
use crate::utils::file_has_content;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Generation settings.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Directory of previously generated license and notice files to reuse
    pub reference_dir: Option<PathBuf>,
    /// Keep full `about_resource` paths and honor directory-style
    /// `about_file_path` values
    pub legacy_placement: bool,
}

/// Everything a generation run produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Records that were written, with their descriptor location set
    pub records: Vec<About>,
    pub stats: GenerationStats,
}

/// Writes descriptor, license and notice files for an inventory.
pub struct Generator {
    options: GenerateOptions,
    provider: Arc<dyn LicenseProvider>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GenerateOptions::default())
    }
}

impl Generator {
    /// Create a generator that never fetches licenses.
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            provider: Arc::new(NoOpProvider),
        }
    }

    /// Use `provider` for license keys missing from the reference library.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn LicenseProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate files for `inventory` under `target_dir`.
    pub fn generate(
        &self,
        inventory: &RawInventory,
        target_dir: &Path,
    ) -> Result<(Vec<Diagnostic>, Vec<About>)> {
        let report = self.run(inventory, target_dir)?;
        Ok((report.diagnostics, report.records))
    }

    /// Read the inventory file at `inventory_path` and generate from it.
    pub fn generate_file(
        &self,
        inventory_path: &Path,
        target_dir: &Path,
    ) -> Result<GenerationReport> {
        let inventory = RawInventory::from_path(inventory_path)?;
        self.run(&inventory, target_dir)
    }

    /// Generate files and return the full report.
    ///
    /// Fails only when the target directory cannot be created or written,
    /// or the reference directory cannot be read.
    pub fn run(&self, inventory: &RawInventory, target_dir: &Path) -> Result<GenerationReport> {
        let start = Instant::now();
        std::fs::create_dir_all(target_dir).map_err(|e| {
            AboutError::generation(
                format!("creating {}", target_dir.display()),
                GenerationErrorKind::TargetDirectory(e.to_string()),
            )
        })?;

        let load_options = LoadOptions {
            legacy_placement: self.options.legacy_placement,
        };
        let (mut diagnostics, loaded) =
            load_inventory_with(inventory, Some(target_dir), &load_options);

        let reference = match &self.options.reference_dir {
            Some(dir) => {
                let (library, errors) = ReferenceLibrary::load(dir)?;
                diagnostics.extend(errors);
                library
            }
            None => ReferenceLibrary::default(),
        };

        let mut stats = GenerationStats::new();
        let (placed, skipped): (Vec<About>, Vec<About>) =
            loaded.into_iter().partition(|about| about.location().is_some());
        stats.records_skipped = skipped.len();

        let fetched = self.fetch_missing(&placed, &reference, &mut diagnostics);

        let mut reused_keys = HashSet::new();
        let mut fetched_keys = HashSet::new();
        let mut missing_keys = HashSet::new();
        let mut records = Vec::with_capacity(placed.len());

        for mut about in placed {
            let Some(location) = about.location().map(Path::to_path_buf) else {
                continue;
            };
            let display_path = about.about_file_path().unwrap_or_default().to_string();
            let parent = location
                .parent()
                .map_or_else(|| target_dir.to_path_buf(), Path::to_path_buf);

            for license in about.licenses_mut() {
                if let Some(found) = reference.license(&license.key) {
                    reused_keys.insert(license.key.clone());
                    *license = found.clone();
                } else if let Some(found) = fetched.get(&license.key).filter(|l| l.has_text()) {
                    fetched_keys.insert(license.key.clone());
                    *license = found.clone();
                } else {
                    diagnostics.push(Diagnostic::error(format!(
                        "Cannot generate valid .ABOUT file for: \"{display_path}\". \
                         Reference license is missing: {}",
                        license.key
                    )));
                    missing_keys.insert(license.key.clone());
                }
            }

            let notice = resolve_notice(&mut about, &reference, &display_path, &mut diagnostics);

            if write_if_changed(&location, about.dumps().as_bytes())? {
                stats.descriptors_written += 1;
            } else {
                stats.descriptors_unchanged += 1;
            }
            for license in about.licenses() {
                let Some(text) = &license.text else {
                    continue;
                };
                if write_if_changed(&parent.join(&license.file), text.as_bytes())? {
                    stats.license_files_written += 1;
                }
            }
            if let Some((file, text)) = notice {
                if write_if_changed(&parent.join(file), text.as_bytes())? {
                    stats.notices_written += 1;
                }
            }
            records.push(about);
        }

        stats.licenses_reused = reused_keys.len();
        stats.licenses_fetched = fetched_keys.len();
        stats.licenses_missing = missing_keys.len();
        stats.duration = start.elapsed();
        stats.log_summary();

        Ok(GenerationReport {
            diagnostics: dedupe(diagnostics),
            records,
            stats,
        })
    }

    /// Fetch every license key the reference library does not have.
    fn fetch_missing(
        &self,
        records: &[About],
        reference: &ReferenceLibrary,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> IndexMap<String, License> {
        let missing: IndexSet<&str> = records
            .iter()
            .flat_map(About::licenses)
            .map(|license| license.key.as_str())
            .filter(|key| reference.license(key).is_none())
            .collect();
        if missing.is_empty() {
            return IndexMap::new();
        }

        let keys: Vec<String> = missing.into_iter().map(str::to_string).collect();
        tracing::info!(
            keys = keys.len(),
            provider = self.provider.name(),
            "Fetching licenses missing from the reference library"
        );
        let (fetched, errors) = self.provider.fetch_licenses(&keys);
        diagnostics.extend(errors);
        fetched
    }
}

/// Decide which notice file to write for a record, if any.
///
/// A record with notice text and no `notice_file` gets `<basename>.NOTICE`.
/// A `notice_file` with no text of its own is looked up in the reference
/// library by file name.
fn resolve_notice(
    about: &mut About,
    reference: &ReferenceLibrary,
    display_path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<(String, String)> {
    let text = about.notice_text().map(str::to_string);
    match about.notice_file().map(str::to_string) {
        Some(file) => {
            let text =
                text.or_else(|| reference.notice(resource_name(&file)).map(str::to_string));
            if text.is_none() {
                diagnostics.push(Diagnostic::error(format!(
                    "Cannot generate valid .ABOUT file for: \"{display_path}\". \
                     Empty or missing notice_file: {file}"
                )));
            }
            text.map(|text| (file, text))
        }
        None => {
            let text = text?;
            let file = format!(
                "{}.NOTICE",
                resource_name(about.about_resource().unwrap_or_default())
            );
            about.set(NOTICE_FILE, file.clone());
            Some((file, text))
        }
    }
}

/// Write `content` to `path` unless the file already holds it.
///
/// Returns whether the file was written.
fn write_if_changed(path: &Path, content: &[u8]) -> Result<bool> {
    if file_has_content(path, content) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AboutError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| AboutError::io(path, e))?;
    Ok(true)
}

/// Generate descriptor files for `inventory` under `target_dir`, reusing
/// license and notice files from `reference_dir` when given.
///
/// No license is fetched over the network: keys missing from the reference
/// directory are reported.
pub fn generate_about_files(
    inventory: &RawInventory,
    target_dir: &Path,
    reference_dir: Option<&Path>,
) -> Result<(Vec<Diagnostic>, Vec<About>)> {
    let generator = Generator::new(GenerateOptions {
        reference_dir: reference_dir.map(Path::to_path_buf),
        legacy_placement: false,
    });
    generator.generate(inventory, target_dir)
}
