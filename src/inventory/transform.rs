//! Column transformations applied to a CSV inventory before generation.
//!
//! A transform configuration is YAML:
//!
//! ```yaml
//! column_renamings:
//!   'Directory/Location': about_resource
//!   foo: bar
//! kept_columns:
//!   - about_resource
//!   - name
//! required_columns:
//!   - name
//! ```
//!
//! Renamings apply first; `kept_columns` and `required_columns` refer to the
//! renamed columns. `about_resource` is always required.

use super::{tabular, RawInventory, Row};
use crate::error::{AboutError, ErrorContext, Result};
use crate::model::fields::ABOUT_RESOURCE;
use crate::model::Diagnostic;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Transform settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TransformConfig {
    /// Source column name to new column name (case-insensitive source match)
    pub column_renamings: IndexMap<String, String>,
    /// Only keep these columns, when not empty
    pub kept_columns: Vec<String>,
    /// Columns that must have a value in every row
    pub required_columns: Vec<String>,
}

/// Applies a [`TransformConfig`] to inventories.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Load a transformer from a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AboutError::io(path, e))?;
        let config: TransformConfig = serde_yaml_ng::from_str(&text)
            .map_err(|e| AboutError::config(e.to_string()))
            .with_context(|| format!("parsing transform configuration {}", path.display()))?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Apply the transformation.
    ///
    /// Duplicate column names stop the transformation with no rows returned.
    /// Rows missing required values are reported but still returned.
    pub fn transform(&self, inventory: &RawInventory) -> (RawInventory, Vec<Diagnostic>) {
        let cleaned: Vec<String> = inventory
            .columns()
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &cleaned {
            *counts.entry(name.as_str()).or_default() += 1;
        }
        let dupes: BTreeSet<&str> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect();
        if !dupes.is_empty() {
            let diagnostics = dupes
                .into_iter()
                .map(|name| Diagnostic::critical(format!("Duplicated column name: {name}")))
                .collect();
            return (RawInventory::with_columns(cleaned, Vec::new()), diagnostics);
        }

        let renamings: HashMap<String, String> = self
            .config
            .column_renamings
            .iter()
            .map(|(from, to)| (from.trim().to_lowercase(), to.trim().to_lowercase()))
            .collect();
        let renamed: Vec<String> = cleaned
            .into_iter()
            .map(|name| renamings.get(&name).cloned().unwrap_or(name))
            .collect();

        let kept: BTreeSet<String> = self
            .config
            .kept_columns
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        let keep = |name: &String| kept.is_empty() || kept.contains(name);

        let rows: Vec<Row> = inventory
            .rows()
            .iter()
            .map(|row| {
                inventory
                    .columns()
                    .iter()
                    .zip(&renamed)
                    .filter(|(_, new_name)| keep(*new_name))
                    .map(|(old_name, new_name)| {
                        let value = row.get(old_name).cloned().unwrap_or_default();
                        (new_name.clone(), value)
                    })
                    .collect()
            })
            .collect();
        let columns: Vec<String> = renamed.into_iter().filter(|c| keep(c)).collect();

        let diagnostics = self.check_required_columns(&rows);
        (RawInventory::with_columns(columns, rows), diagnostics)
    }

    fn check_required_columns(&self, rows: &[Row]) -> Vec<Diagnostic> {
        let mut required: BTreeSet<String> = self
            .config
            .required_columns
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        required.insert(ABOUT_RESOURCE.to_string());

        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let missing: Vec<&str> = required
                    .iter()
                    .filter(|name| row.get(*name).map_or(true, |v| v.trim().is_empty()))
                    .map(String::as_str)
                    .collect();
                if missing.is_empty() {
                    return None;
                }
                Some(Diagnostic::critical(format!(
                    "Row {} is missing required values for columns: {}",
                    index + 1,
                    missing.join(", ")
                )))
            })
            .collect()
    }
}

/// Transform the CSV at `input` and write it to `output`.
///
/// Nothing is written when the transformation reports any diagnostic.
pub fn transform_csv_to_csv(
    input: &Path,
    output: &Path,
    transformer: &Transformer,
) -> Result<Vec<Diagnostic>> {
    let file = std::fs::File::open(input).map_err(|e| AboutError::io(input, e))?;
    let inventory = tabular::read_csv(std::io::BufReader::new(file))
        .with_context(|| format!("reading {}", input.display()))?;

    let (transformed, diagnostics) = transformer.transform(&inventory);
    if !diagnostics.is_empty() {
        return Ok(diagnostics);
    }

    let out = std::fs::File::create(output).map_err(|e| AboutError::io(output, e))?;
    tabular::write_csv(
        std::io::BufWriter::new(out),
        transformed.columns(),
        transformed.rows(),
    )?;
    tracing::info!(
        rows = transformed.len(),
        output = %output.display(),
        "Wrote transformed inventory"
    );
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(csv: &str) -> RawInventory {
        tabular::read_csv(csv.as_bytes()).unwrap()
    }

    fn transformer(yaml: &str) -> Transformer {
        Transformer::new(serde_yaml_ng::from_str(yaml).unwrap())
    }

    #[test]
    fn test_renaming_and_cleaning() {
        let t = transformer("column_renamings:\n  'Directory/Location': about_resource\n");
        let (out, diags) = t.transform(&inventory(" Directory/Location ,Name\nsrc/a.c,a\n"));
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(out.columns(), ["about_resource", "name"]);
        assert_eq!(out.rows()[0]["about_resource"], "src/a.c");
        assert_eq!(out.rows()[0]["name"], "a");
    }

    #[test]
    fn test_kept_columns() {
        let t = transformer("kept_columns: [about_resource, version]\n");
        let (out, diags) = t.transform(&inventory("about_resource,name,version\na,b,1\n"));
        assert!(diags.is_empty());
        assert_eq!(out.columns(), ["about_resource", "version"]);
        assert!(!out.rows()[0].contains_key("name"));
    }

    #[test]
    fn test_duplicate_columns() {
        let t = Transformer::default();
        let (out, diags) = t.transform(&inventory("about_resource,Name,name\na,b,c\n"));
        assert_eq!(diags, vec![Diagnostic::critical("Duplicated column name: name")]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_required_columns() {
        let t = transformer("required_columns: [version, name]\n");
        let (_, diags) = t.transform(&inventory("about_resource,name,version\na,,\n,n,1\nb,n,1\n"));
        assert_eq!(
            diags,
            vec![
                Diagnostic::critical("Row 1 is missing required values for columns: name, version"),
                Diagnostic::critical("Row 2 is missing required values for columns: about_resource"),
            ]
        );
    }

    #[test]
    fn test_transform_csv_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "Path,Name\na.zip,A\n").unwrap();

        let t = transformer("column_renamings:\n  path: about_resource\n");
        let diags = transform_csv_to_csv(&input, &output, &t).unwrap();
        assert!(diags.is_empty());
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "about_resource,name\na.zip,A\n"
        );

        let bad = transformer("required_columns: [version]\n");
        std::fs::remove_file(&output).unwrap();
        let diags = transform_csv_to_csv(&input, &output, &bad).unwrap();
        assert_eq!(diags.len(), 1);
        assert!(!output.exists());
    }
}
