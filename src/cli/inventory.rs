//! Inventory command handler.
//!
//! Collects the ABOUT files under a location and exports them as CSV or JSON.

use super::finish;
use crate::inventory::{collect_inventory_with, save_as_csv, save_as_json, CollectOptions};
use anyhow::{bail, Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Csv,
    Json,
}

fn export_format(output: &Path) -> Option<ExportFormat> {
    let ext = output.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(ExportFormat::Csv),
        "json" => Some(ExportFormat::Json),
        _ => None,
    }
}

/// Run the inventory command, returning the desired exit code.
pub fn run_inventory(
    location: &Path,
    output: &Path,
    check_files: bool,
    verbose: bool,
) -> Result<i32> {
    let Some(format) = export_format(output) else {
        bail!(
            "Unsupported output file type: {} (expected .csv or .json)",
            output.display()
        );
    };

    let (diagnostics, records) =
        collect_inventory_with(location, &CollectOptions { check_files })
            .with_context(|| format!("collecting ABOUT files from {}", location.display()))?;

    let written = match format {
        ExportFormat::Csv => save_as_csv(output, &records),
        ExportFormat::Json => save_as_json(output, &records),
    };
    written.with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        records = records.len(),
        "Wrote inventory to {}",
        output.display()
    );
    finish(&diagnostics, verbose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::exit_codes;

    #[test]
    fn test_export_format() {
        assert_eq!(export_format(Path::new("out.CSV")), Some(ExportFormat::Csv));
        assert_eq!(export_format(Path::new("out.json")), Some(ExportFormat::Json));
        assert_eq!(export_format(Path::new("out.xlsx")), None);
        assert_eq!(export_format(Path::new("out")), None);
    }

    #[test]
    fn test_run_inventory_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(
            src.join("a.zip.ABOUT"),
            "about_resource: a.zip\nname: a\n",
        )
        .unwrap();
        let output = dir.path().join("inventory.csv");

        let code = run_inventory(&src, &output, false, false).unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text, "about_file_path,about_resource,name\na.zip.ABOUT,a.zip,a\n");
    }

    #[test]
    fn test_unsupported_output_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_inventory(dir.path(), &dir.path().join("out.txt"), false, false);
        assert!(result.is_err());
    }
}
