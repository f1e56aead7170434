//! End-to-end tests for ABOUT file generation.

use about_tools::generate::{generate_about_files, GenerateOptions, Generator};
use about_tools::inventory::{RawInventory, Row};
use about_tools::license::StaticProvider;
use about_tools::model::{About, Diagnostic, License, Severity, DEFAULT_LICENSE_URL_BASE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn inventory(rows: &[&[(&str, &str)]]) -> RawInventory {
    RawInventory::from_rows(
        rows.iter()
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<Row>()
            })
            .collect(),
    )
}

/// Relative paths of every file under `root`, sorted.
fn files_under(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

fn static_provider() -> Arc<StaticProvider> {
    Arc::new(StaticProvider::new([
        License::new("mit", DEFAULT_LICENSE_URL_BASE)
            .with_name("MIT License")
            .with_text("Permission is hereby granted, free of charge..."),
        License::new("apache-2.0", DEFAULT_LICENSE_URL_BASE)
            .with_name("Apache 2.0")
            .with_text("Apache License\nVersion 2.0, January 2004\n"),
    ]))
}

mod examples {
    use super::*;

    #[test]
    fn test_single_row_without_about_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let inv = inventory(&[&[
            ("about_resource", "about.zip"),
            ("name", "AboutCode"),
            ("version", "0.11.0"),
        ]]);

        let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();

        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(records.len(), 1);
        assert_eq!(files_under(dir.path()), vec!["about.zip.ABOUT"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("about.zip.ABOUT")).unwrap(),
            "about_resource: about.zip\nname: AboutCode\nversion: 0.11.0\n"
        );
    }

    #[test]
    fn test_row_missing_about_resource() {
        let dir = tempfile::tempdir().unwrap();
        let inv = inventory(&[&[("name", "AboutCode"), ("version", "0.11.0")]]);

        let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();

        assert_eq!(
            diags,
            vec![Diagnostic::critical(
                "Required field \"about_resource\" is missing."
            )]
        );
        assert!(records.is_empty());
        assert!(files_under(dir.path()).is_empty());
    }

    #[test]
    fn test_blank_about_resource_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let inv = inventory(&[
            &[("about_resource", "a.zip"), ("name", "a")],
            &[("about_resource", "  "), ("name", "b")],
        ]);

        let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();

        assert_eq!(
            diags,
            vec![Diagnostic::critical(
                "Required field \"about_resource\" is missing in row: 2."
            )]
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_reference_directory_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let inv = RawInventory::from_path(&fixture_path("inventory/basic.csv")).unwrap();

        let (diags, records) =
            generate_about_files(&inv, dir.path(), Some(&fixture_path("reference"))).unwrap();

        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(records.len(), 2);
        assert_eq!(
            files_under(dir.path()),
            vec![
                "about.zip.ABOUT",
                "apache-2.0.LICENSE",
                "lib/zlib-1.2.11.tar.gz.ABOUT",
                "lib/zlib.LICENSE",
            ]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("about.zip.ABOUT")).unwrap(),
            "about_resource: about.zip\n\
             name: AboutCode\n\
             version: 0.11.0\n\
             license_expression: apache-2.0\n\
             copyright: Copyright (c) nexB Inc.\n\
             owner: nexB Inc.\n"
        );
        assert_eq!(
            std::fs::read(dir.path().join("apache-2.0.LICENSE")).unwrap(),
            std::fs::read(fixture_path("reference/apache-2.0.LICENSE")).unwrap()
        );
        assert_eq!(records[0].licenses()[0].name.as_deref(), Some("Apache License 2.0"));
    }
}

mod reuse {
    use super::*;

    #[test]
    fn test_second_run_reuses_reference_without_fetching() {
        let first_out = tempfile::tempdir().unwrap();
        let second_out = tempfile::tempdir().unwrap();
        let inv = inventory(&[
            &[
                ("about_resource", "about.zip"),
                ("license_expression", "mit or apache-2.0"),
                ("notice_text", "AboutCode notice"),
            ],
            &[("about_resource", "lib/util.jar"), ("license_expression", "mit")],
        ]);

        let first_provider = static_provider();
        let first = Generator::new(GenerateOptions::default())
            .with_provider(first_provider.clone())
            .run(&inv, first_out.path())
            .unwrap();
        assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);
        assert_eq!(first_provider.requested(), 2);

        let second_provider = static_provider();
        let second = Generator::new(GenerateOptions {
            reference_dir: Some(first_out.path().to_path_buf()),
            legacy_placement: false,
        })
        .with_provider(second_provider.clone())
        .run(&inv, second_out.path())
        .unwrap();

        assert!(second.diagnostics.is_empty(), "{:?}", second.diagnostics);
        assert_eq!(second_provider.requested(), 0);
        assert_eq!(second.stats.licenses_fetched, 0);
        assert_eq!(second.stats.licenses_reused, 2);

        let first_files = files_under(first_out.path());
        assert_eq!(first_files, files_under(second_out.path()));
        for file in first_files
            .iter()
            .filter(|f| f.ends_with(".LICENSE") || f.ends_with(".NOTICE"))
        {
            assert_eq!(
                std::fs::read(first_out.path().join(file)).unwrap(),
                std::fs::read(second_out.path().join(file)).unwrap(),
                "{file} differs"
            );
        }
        assert!(first_files.contains(&"about.zip.NOTICE".to_string()));
        assert!(first_files.contains(&"lib/mit.LICENSE".to_string()));
    }

    #[test]
    fn test_written_descriptor_loads_back_to_same_record() {
        let dir = tempfile::tempdir().unwrap();
        let inv = RawInventory::from_path(&fixture_path("inventory/basic.csv")).unwrap();
        let (_, records) =
            generate_about_files(&inv, dir.path(), Some(&fixture_path("reference"))).unwrap();

        for record in &records {
            let location = record.location().unwrap();
            let (loaded, diags) = About::load(location).unwrap();
            assert!(diags.is_empty(), "{diags:?}");
            assert_eq!(loaded.unwrap().to_dict(false), record.to_dict(false));
        }
    }

    #[test]
    fn test_crlf_cell_round_trips_through_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "about_resource,description,internal_note\r\n\
                   a.zip,\"line one\r\nline two\",\"first\rsecond\"\r\n";
        let inv = RawInventory::from_csv_reader(csv.as_bytes()).unwrap();

        let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();
        assert!(
            diags.iter().all(|d| d.severity == Severity::Info),
            "{diags:?}"
        );
        assert_eq!(records[0].get("description"), Some("line one\nline two"));
        assert_eq!(records[0].get("internal_note"), Some("first\nsecond"));

        let (loaded, load_diags) = About::load(&dir.path().join("a.zip.ABOUT")).unwrap();
        assert!(
            load_diags.iter().all(|d| d.severity == Severity::Info),
            "{load_diags:?}"
        );
        assert_eq!(loaded.unwrap().to_dict(false), records[0].to_dict(false));
    }
}

mod path_safety {
    use super::*;

    fn errors(diags: &[Diagnostic]) -> Vec<&Diagnostic> {
        diags.iter().filter(|d| d.severity == Severity::Error).collect()
    }

    #[test]
    fn test_segment_with_space_writes_nothing() {
        for (field, value) in [
            ("about_resource", "src /a.c"),
            ("about_resource", " a.c"),
            ("about_file_path", "docs/ a.c.ABOUT"),
        ] {
            let dir = tempfile::tempdir().unwrap();
            let mut pairs = vec![("about_resource", "a.c"), (field, value)];
            if field == "about_resource" {
                pairs.remove(0);
            }
            let inv = inventory(&[pairs.as_slice()]);

            let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();

            assert_eq!(errors(&diags).len(), 1, "{field}={value:?}: {diags:?}");
            assert!(records.is_empty());
            assert!(files_under(dir.path()).is_empty());
        }
    }

    #[test]
    fn test_backslash_names_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        let inv = inventory(&[&[("about_resource", "src\\lib\\a.c")]]);

        let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();

        assert_eq!(
            diags,
            vec![Diagnostic::error(
                "Skipping invalid \"about_resource\". Path must be a POSIX path using \
                 \"/\" (slash) as separator: \"src\\lib\\a.c\""
            )]
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_bad_record_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let inv = inventory(&[
            &[("about_resource", "../escape.c")],
            &[("about_resource", ".")],
            &[("about_resource", "ok/a.c")],
            &[("about_resource", "OK/A.c")],
        ]);

        let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();

        assert_eq!(errors(&diags).len(), 3, "{diags:?}");
        assert_eq!(records.len(), 1);
        assert_eq!(files_under(dir.path()), vec!["ok/a.c.ABOUT"]);
    }

    #[test]
    fn test_explicit_about_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let inv = inventory(&[&[
            ("about_resource", "."),
            ("about_file_path", "project/project.ABOUT"),
            ("name", "project"),
        ]]);

        let (diags, records) = generate_about_files(&inv, dir.path(), None).unwrap();

        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(records.len(), 1);
        assert_eq!(files_under(dir.path()), vec!["project/project.ABOUT"]);
    }

    #[test]
    fn test_legacy_placement_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let inv = inventory(&[&[
            ("about_resource", "lib/a.jar"),
            ("about_file_path", "meta/"),
        ]]);
        let generator = Generator::new(GenerateOptions {
            reference_dir: None,
            legacy_placement: true,
        });

        let (diags, records) = generator.generate(&inv, dir.path()).unwrap();

        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(records[0].about_resource(), Some("lib/a.jar"));
        assert_eq!(files_under(dir.path()), vec!["meta/a.jar.ABOUT"]);
    }
}
