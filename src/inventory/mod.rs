//! Inventory loading.
//!
//! An inventory is a sequence of rows, each an ordered mapping of field name
//! to value, read from CSV or JSON and normalized to [`RawInventory`].
//! [`load_inventory`] validates it into [`About`] records:
//!
//! 1. An empty inventory is rejected, then the column names are checked.
//!    Any structural problem rejects the whole inventory because column
//!    identity cannot be trusted.
//! 2. Per row: a blank `about_resource` voids the row; otherwise the row is
//!    built with [`About::from_mapping`].
//! 3. Per record: the descriptor path is planned. An unsafe path is reported
//!    as ERROR and the record is kept for inspection, without a location, so
//!    that generation skips it.
//!
//! ```no_run
//! use about_tools::inventory::{load_inventory, RawInventory};
//! use std::path::Path;
//!
//! let inventory = RawInventory::from_path(Path::new("inventory.csv"))?;
//! let (errors, records) = load_inventory(&inventory, Some(Path::new("out")));
//! for error in &errors {
//!     println!("{error}");
//! }
//! println!("{} records", records.len());
//! # Ok::<(), about_tools::AboutError>(())
//! ```

pub mod collect;
pub mod export;
mod json;
mod tabular;
pub mod transform;

pub use collect::{
    check_file_names, collect_inventory, collect_inventory_with, is_about_file, CollectOptions,
};
pub use export::{field_names, save_as_csv, save_as_json};
pub use json::value_to_text;
pub use tabular::{read_csv, write_csv};
pub use transform::{transform_csv_to_csv, TransformConfig, Transformer};

use crate::error::{AboutError, ErrorContext, Result};
use crate::generate::PathPlanner;
use crate::model::fields::{ABOUT_FILE_PATH, ABOUT_RESOURCE};
use crate::model::{dedupe, validate_field_names, About, Diagnostic, ResourcePolicy};
use indexmap::{IndexMap, IndexSet};
use std::path::Path;

/// One raw inventory row.
pub type Row = IndexMap<String, String>;

/// Rows read from an inventory file, with the column names in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInventory {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Supported inventory file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFormat {
    Csv,
    Json,
}

impl InventoryFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl RawInventory {
    /// Build from rows; the columns are the union of row keys in first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns: IndexSet<&String> = rows.iter().flat_map(IndexMap::keys).collect();
        let columns = columns.into_iter().cloned().collect();
        Self { columns, rows }
    }

    /// Build from explicit columns, which may contain duplicates.
    pub fn with_columns(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        tabular::read_csv(reader)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(Self::from_rows(json::rows_from_value(value)?))
    }

    /// Read an inventory file, dispatching on its `.csv` / `.json` extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let format =
            InventoryFormat::from_path(path).ok_or_else(|| AboutError::unsupported_inventory(path))?;
        let context = || format!("reading {}", path.display());
        match format {
            InventoryFormat::Csv => {
                let file = std::fs::File::open(path).map_err(|e| AboutError::io(path, e))?;
                Self::from_csv_reader(std::io::BufReader::new(file)).with_context(context)
            }
            InventoryFormat::Json => {
                let text = std::fs::read_to_string(path).map_err(|e| AboutError::io(path, e))?;
                Self::from_json_str(&text).with_context(context)
            }
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Options for [`load_inventory_with`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Keep full `about_resource` paths and honor directory-style
    /// `about_file_path` values ending in `/`
    pub legacy_placement: bool,
}

/// Load an inventory into records, planning descriptor locations under `target_dir`.
pub fn load_inventory(
    inventory: &RawInventory,
    target_dir: Option<&Path>,
) -> (Vec<Diagnostic>, Vec<About>) {
    load_inventory_with(inventory, target_dir, &LoadOptions::default())
}

/// Load an inventory with explicit options.
pub fn load_inventory_with(
    inventory: &RawInventory,
    target_dir: Option<&Path>,
    options: &LoadOptions,
) -> (Vec<Diagnostic>, Vec<About>) {
    if inventory.is_empty() {
        return (vec![Diagnostic::critical("Empty inventory.")], Vec::new());
    }

    let structural = validate_field_names(inventory.columns(), true);
    if !structural.is_empty() {
        return (dedupe(structural), Vec::new());
    }

    let mut diagnostics = Vec::new();
    let mut records = Vec::with_capacity(inventory.len());
    let mut planner = PathPlanner::new(options.legacy_placement);

    for (index, row) in inventory.rows().iter().enumerate() {
        let row_number = index + 1;
        let raw_resource = row.get(ABOUT_RESOURCE).map_or("", String::as_str);
        if raw_resource.trim().is_empty() {
            diagnostics.push(Diagnostic::critical(format!(
                "Required field \"about_resource\" is missing in row: {row_number}."
            )));
            continue;
        }

        let (about, row_diagnostics) = About::from_mapping(row, &ResourcePolicy::Required);
        let Some(mut about) = about else {
            diagnostics.extend(row_diagnostics.into_iter().map(|d| {
                if d.is_critical() {
                    Diagnostic::critical(format!("{} (row: {row_number})", d.message))
                } else {
                    d
                }
            }));
            continue;
        };
        diagnostics.extend(row_diagnostics);

        let raw_file_path = row.get(ABOUT_FILE_PATH).map(String::as_str);
        match planner.plan(raw_resource, raw_file_path) {
            Ok(planned) => {
                about.set(ABOUT_FILE_PATH, planned.about_file_path.clone());
                if let Some(target) = target_dir {
                    about.set(ABOUT_RESOURCE, planned.about_resource);
                    about.set_location(target.join(&planned.about_file_path));
                }
            }
            Err(error) => diagnostics.push(error),
        }
        records.push(about);
    }

    tracing::debug!(
        rows = inventory.len(),
        records = records.len(),
        "Loaded inventory"
    );

    (dedupe(diagnostics), records)
}

/// Read and load an inventory file.
///
/// Unreadable files and unsupported formats are fatal errors.
pub fn load_inventory_file(
    path: &Path,
    target_dir: Option<&Path>,
    options: &LoadOptions,
) -> Result<(Vec<Diagnostic>, Vec<About>)> {
    let inventory = RawInventory::from_path(path)?;
    Ok(load_inventory_with(&inventory, target_dir, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_single_valid_row() {
        let inventory = RawInventory::from_rows(vec![row(&[
            ("about_resource", "about.zip"),
            ("name", "AboutCode"),
            ("version", "0.11.0"),
        ])]);
        let target = Path::new("/target");
        let (errors, records) = load_inventory(&inventory, Some(target));
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].about_file_path(), Some("about.zip.ABOUT"));
        assert_eq!(records[0].location(), Some(target.join("about.zip.ABOUT").as_path()));
    }

    #[test]
    fn test_missing_about_resource_column() {
        let inventory = RawInventory::from_rows(vec![row(&[("name", "AboutCode")])]);
        let (errors, records) = load_inventory(&inventory, None);
        assert_eq!(
            errors,
            vec![Diagnostic::critical(
                "Required field \"about_resource\" is missing."
            )]
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_structural_error_rejects_all_rows() {
        let inventory = RawInventory::from_rows(vec![
            row(&[("about_resource", "a"), ("Name", "x")]),
            row(&[("about_resource", "b"), ("Name", "y")]),
        ]);
        let (errors, records) = load_inventory(&inventory, None);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'Name' must be lowercase"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_blank_about_resource_voids_only_that_row() {
        let inventory = RawInventory::from_rows(vec![
            row(&[("about_resource", "a.zip")]),
            row(&[("about_resource", "  ")]),
            row(&[("about_resource", "c.zip")]),
        ]);
        let (errors, records) = load_inventory(&inventory, None);
        assert_eq!(
            errors,
            vec![Diagnostic::critical(
                "Required field \"about_resource\" is missing in row: 2."
            )]
        );
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_voided_rows_each_reported() {
        let inventory = RawInventory::from_rows(vec![
            row(&[("about_resource", "a.zip"), ("modified", "maybe")]),
            row(&[("about_resource", "b.zip"), ("modified", "no")]),
            row(&[("about_resource", "c.zip"), ("modified", "maybe")]),
        ]);
        let (errors, records) = load_inventory(&inventory, None);
        let critical: Vec<&str> = errors
            .iter()
            .filter(|d| d.is_critical())
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(critical.len(), 2, "{errors:?}");
        assert!(critical[0].ends_with("(row: 1)"));
        assert!(critical[1].ends_with("(row: 3)"));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_custom_field_info_reported_once() {
        let inventory = RawInventory::from_rows(vec![
            row(&[("about_resource", "a"), ("team", "x")]),
            row(&[("about_resource", "b"), ("team", "y")]),
        ]);
        let (errors, records) = load_inventory(&inventory, None);
        assert_eq!(errors, vec![Diagnostic::info("Field team is a custom field.")]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_backslash_path_tolerated_without_location() {
        let inventory =
            RawInventory::from_rows(vec![row(&[("about_resource", "lib\\a.zip")])]);
        let (errors, records) = load_inventory(&inventory, Some(Path::new("/t")));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Error);
        assert!(errors[0].message.contains("lib\\a.zip"));
        assert_eq!(records.len(), 1);
        assert!(records[0].location().is_none());
    }

    #[test]
    fn test_about_resource_rewritten_to_file_name() {
        let inventory =
            RawInventory::from_rows(vec![row(&[("about_resource", "lib/vendor/a.zip")])]);
        let (_, records) = load_inventory(&inventory, Some(Path::new("/t")));
        assert_eq!(records[0].about_resource(), Some("a.zip"));
        assert_eq!(records[0].about_file_path(), Some("lib/vendor/a.zip.ABOUT"));

        let options = LoadOptions {
            legacy_placement: true,
        };
        let (_, records) = load_inventory_with(&inventory, Some(Path::new("/t")), &options);
        assert_eq!(records[0].about_resource(), Some("lib/vendor/a.zip"));
    }

    #[test]
    fn test_empty_inventory() {
        let inventory = RawInventory::with_columns(vec!["about_resource".to_string()], vec![]);
        let (errors, _) = load_inventory(&inventory, None);
        assert_eq!(errors, vec![Diagnostic::critical("Empty inventory.")]);
    }

    #[test]
    fn test_unsupported_inventory_type() {
        let err = RawInventory::from_path(Path::new("inventory.xlsx")).unwrap_err();
        assert!(matches!(err, AboutError::Inventory { .. }));
    }
}
