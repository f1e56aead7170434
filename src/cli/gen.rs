//! Gen command handler.
//!
//! Generates ABOUT, license and notice files from an inventory.

use super::finish;
use crate::config::{AppConfig, Validatable};
use crate::generate::{GenerateOptions, Generator};
use crate::license::{LicenseProvider, NoOpProvider};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Build the license provider the configuration asks for.
fn build_provider(config: &AppConfig) -> Result<Arc<dyn LicenseProvider>> {
    if config.generation.fetch_licenses {
        api_provider(config)
    } else {
        Ok(Arc::new(NoOpProvider))
    }
}

#[cfg(feature = "license-api")]
fn api_provider(config: &AppConfig) -> Result<Arc<dyn LicenseProvider>> {
    use crate::license::{DejaCodeClient, DejaCodeConfig};

    let url = config.api.url.clone().unwrap_or_default();
    let key = config.api.key.clone().unwrap_or_default();
    let client_config = DejaCodeConfig::new(url, key)
        .with_timeout(std::time::Duration::from_secs(config.api.timeout_secs));
    let client =
        DejaCodeClient::new(client_config).context("failed to create the license API client")?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "license-api"))]
#[allow(clippy::unnecessary_wraps)]
fn api_provider(_config: &AppConfig) -> Result<Arc<dyn LicenseProvider>> {
    tracing::warn!(
        "License fetching requested but the 'license-api' feature is not enabled. \
         Rebuild with --features license-api to fetch licenses."
    );
    Ok(Arc::new(NoOpProvider))
}

/// Run the gen command, returning the desired exit code.
pub fn run_gen(
    inventory: &Path,
    target_dir: &Path,
    config: &AppConfig,
    verbose: bool,
) -> Result<i32> {
    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }

    let provider = build_provider(config)?;
    let generator = Generator::new(GenerateOptions {
        reference_dir: config.generation.reference_dir.clone(),
        legacy_placement: config.generation.legacy_placement,
    })
    .with_provider(provider);

    let report = generator
        .generate_file(inventory, target_dir)
        .with_context(|| format!("generating ABOUT files from {}", inventory.display()))?;

    tracing::info!(
        records = report.records.len(),
        "Generated ABOUT files in {}",
        target_dir.display()
    );
    finish(&report.diagnostics, verbose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::exit_codes;

    #[test]
    fn test_run_gen() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = dir.path().join("inventory.csv");
        std::fs::write(&inventory, "about_resource,name\nabout.zip,AboutCode\n").unwrap();
        let target = dir.path().join("out");

        let code = run_gen(&inventory, &target, &AppConfig::default(), false).unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        assert!(target.join("about.zip.ABOUT").exists());
    }

    #[test]
    fn test_fetch_without_credentials_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = dir.path().join("inventory.csv");
        std::fs::write(&inventory, "about_resource\na.zip\n").unwrap();
        let config = AppConfig::builder().fetch_licenses(true).build();

        assert!(run_gen(&inventory, &dir.path().join("out"), &config, false).is_err());
    }

    #[test]
    fn test_missing_license_fails_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = dir.path().join("inventory.csv");
        std::fs::write(&inventory, "about_resource,license_expression\na.zip,mit\n").unwrap();

        let code =
            run_gen(&inventory, &dir.path().join("out"), &AppConfig::default(), false).unwrap();

        assert_eq!(code, exit_codes::DIAGNOSTICS_FAILED);
    }
}
