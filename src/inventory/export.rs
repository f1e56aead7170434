//! Writing records back out as JSON or CSV inventories.

use super::{tabular, Row};
use crate::error::{AboutError, Result};
use crate::model::fields::{ABOUT_FILE_PATH, ABOUT_RESOURCE, LICENSES, STANDARD_FIELDS};
use crate::model::{About, FieldValue};
use indexmap::IndexSet;
use std::path::Path;

/// Column names for exporting `records`.
///
/// `about_file_path` and `about_resource` first, then the standard fields any
/// record uses in canonical order, then custom fields in first-seen order.
/// `licenses` has no tabular form and is left out.
pub fn field_names(records: &[About]) -> Vec<String> {
    let dicts: Vec<_> = records.iter().map(|r| r.to_dict(true)).collect();

    let mut names: IndexSet<String> = IndexSet::new();
    names.insert(ABOUT_FILE_PATH.to_string());
    names.insert(ABOUT_RESOURCE.to_string());

    for def in STANDARD_FIELDS {
        if def.name == LICENSES || !def.serialized {
            continue;
        }
        if dicts.iter().any(|d| d.contains_key(def.name)) {
            names.insert(def.name.to_string());
        }
    }
    for about in records {
        for name in about.custom_fields().keys() {
            names.insert(name.clone());
        }
    }
    names.into_iter().collect()
}

/// Write records as a JSON array of their serialized form, paths included.
pub fn save_as_json(path: &Path, records: &[About]) -> Result<()> {
    let dicts: Vec<_> = records.iter().map(|r| r.to_dict(true)).collect();
    let json = serde_json::to_string_pretty(&dicts)?;
    std::fs::write(path, json).map_err(|e| AboutError::io(path, e))
}

/// Write records as CSV with the columns from [`field_names`].
pub fn save_as_csv(path: &Path, records: &[About]) -> Result<()> {
    let columns = field_names(records);
    let rows: Vec<Row> = records
        .iter()
        .map(|about| {
            about
                .to_dict(true)
                .into_iter()
                .filter_map(|(name, value)| match value {
                    FieldValue::Text(text) => Some((name, text)),
                    FieldValue::Licenses(_) => None,
                })
                .collect()
        })
        .collect();

    let file = std::fs::File::create(path).map_err(|e| AboutError::io(path, e))?;
    tabular::write_csv(std::io::BufWriter::new(file), &columns, &rows)
}
