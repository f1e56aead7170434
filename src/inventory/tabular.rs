//! CSV inventory reading and writing.

use super::{RawInventory, Row};
use crate::error::{AboutError, Result};
use std::io::{Read, Write};

/// Read a CSV inventory. The first record is the header.
///
/// Header names are kept verbatim, duplicates included, so the structural
/// checks can see them. Short rows are padded with empty values.
pub fn read_csv<R: Read>(reader: R) -> Result<RawInventory> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            let value = record.get(index).unwrap_or_default();
            row.entry(column.clone()).or_insert_with(|| value.to_string());
        }
        rows.push(row);
    }

    Ok(RawInventory::with_columns(columns, rows))
}

/// Write rows as CSV with the given columns; missing values are empty.
pub fn write_csv<W: Write>(writer: W, columns: &[String], rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|c| row.get(c).map_or("", String::as_str)),
        )?;
    }
    writer.flush().map_err(AboutError::from)
}
