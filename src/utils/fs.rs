//! Filesystem helpers.

use std::path::Path;

/// Whether the file at `path` already holds exactly `data`.
///
/// A missing or unreadable file never matches.
pub fn file_has_content(path: &Path, data: &[u8]) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() == data.len() as u64 => {
            std::fs::read(path).is_ok_and(|existing| existing == data)
        }
        _ => false,
    }
}
