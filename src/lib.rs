//! **Attribution metadata for software components, as ABOUT files.**
//!
//! `about-tools` manages "About" records: the name, version, license
//! expression, copyright and any custom fields describing one piece of code,
//! each optionally backed by a `.ABOUT` descriptor file with `.LICENSE` and
//! `.NOTICE` files next to it.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the [`About`] record, field name validation, license
//!   expressions and the descriptor text format. Problems are reported as
//!   [`Diagnostic`] values with a [`Severity`], never as errors.
//! - **[`inventory`]**: loads CSV and JSON inventories into records, collects
//!   existing ABOUT files from disk, transforms inventory columns and exports
//!   records back to CSV or JSON.
//! - **[`generate`]**: writes descriptor, license and notice files for an
//!   inventory, reusing files from a reference directory.
//! - **[`license`]**: the [`LicenseProvider`] capability used to fetch license
//!   texts, with an HTTP client for the DejaCode license API.
//! - **[`config`]**: YAML configuration discovery, loading and validation.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use about_tools::{generate_about_files, RawInventory};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inventory = RawInventory::from_path(Path::new("inventory.csv"))?;
//!     let (diagnostics, records) =
//!         generate_about_files(&inventory, Path::new("out"), Some(Path::new("previous-out")))?;
//!
//!     for diagnostic in &diagnostics {
//!         println!("{diagnostic}");
//!     }
//!     println!("Wrote {} ABOUT files", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `license-api` (default): the DejaCode license API client. This adds the
//!   `reqwest` dependency.

#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::fn_params_excessive_bools,
    clippy::must_use_candidate
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod inventory;
pub mod license;
pub mod model;
pub mod utils;

pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use error::{AboutError, ErrorContext, Result};
pub use generate::{
    generate_about_files, GenerateOptions, GenerationReport, GenerationStats, Generator,
    ReferenceLibrary,
};
pub use inventory::{
    collect_inventory, collect_inventory_with, load_inventory, load_inventory_with,
    save_as_csv, save_as_json, CollectOptions, LoadOptions, RawInventory, Transformer,
};
pub use license::{LicenseProvider, NoOpProvider, StaticProvider};
#[cfg(feature = "license-api")]
pub use license::{fetch_licenses, DejaCodeClient, DejaCodeConfig};
pub use model::{About, Diagnostic, License, LicenseExpression, Severity};
