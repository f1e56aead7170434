//! Transform command handler.

use super::finish;
use crate::inventory::{transform_csv_to_csv, Transformer};
use anyhow::{Context, Result};
use std::path::Path;

/// Run the transform command, returning the desired exit code.
///
/// The transformation comes from `config_path` when given, otherwise from
/// the `transform` section of the loaded configuration.
pub fn run_transform(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    app_config: &crate::config::AppConfig,
    verbose: bool,
) -> Result<i32> {
    let transformer = match config_path {
        Some(path) => Transformer::from_file(path)
            .with_context(|| format!("loading transform configuration {}", path.display()))?,
        None => {
            if app_config.transform.is_none() {
                tracing::warn!("No transform configuration given: only column names are cleaned");
            }
            Transformer::new(app_config.transform.clone().unwrap_or_default())
        }
    };

    let diagnostics = transform_csv_to_csv(input, output, &transformer)
        .with_context(|| format!("transforming {}", input.display()))?;
    finish(&diagnostics, verbose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::exit_codes;
    use crate::config::AppConfig;
    use crate::inventory::TransformConfig;

    #[test]
    fn test_run_transform_from_app_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "Resource,Name\na.zip,A\n").unwrap();

        let mut renamings = indexmap::IndexMap::new();
        renamings.insert("resource".to_string(), "about_resource".to_string());
        let config = AppConfig::builder()
            .transform(TransformConfig {
                column_renamings: renamings,
                ..TransformConfig::default()
            })
            .build();

        let code = run_transform(&input, &output, None, &config, false).unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "about_resource,name\na.zip,A\n"
        );
    }

    #[test]
    fn test_run_transform_reports_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        let config_path = dir.path().join("transform.yaml");
        std::fs::write(&input, "about_resource,name\na.zip,\n").unwrap();
        std::fs::write(&config_path, "required_columns: [name]\n").unwrap();

        let code =
            run_transform(&input, &output, Some(&config_path), &AppConfig::default(), false)
                .unwrap();

        assert_eq!(code, exit_codes::DIAGNOSTICS_FAILED);
        assert!(!output.exists());
    }
}
