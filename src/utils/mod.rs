//! Shared utilities.

mod fs;

pub use fs::file_has_content;
