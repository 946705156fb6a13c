//! Batch runner behavior across whole directories

use super::*;
use crate::Error;
use crate::app::services::reconciler::BatchRunner;
use crate::app::services::reconciler::batch::discover_smet_files;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_batch_over_mixed_directory() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    // One matched, one unmatched, one malformed
    write_smet(
        input.path(),
        "matched.smet",
        &[("station_id", "ING_0042"), ("station_name", "Passo Rolle")],
        "1 2 3\n",
    );
    write_smet(
        input.path(),
        "unmatched.smet",
        &[("station_id", "7"), ("station_name", "Elsewhere")],
        "4 5 6\n",
    );
    fs::write(
        input.path().join("broken.smet"),
        "SMET 1.1 ASCII\n[HEADER]\nstation_id = 9\n",
    )
    .unwrap();

    let runner = BatchRunner::new(reconcile_stage(output.path()), false);
    let summary = runner.run(input.path()).unwrap();

    assert_eq!(summary.files_seen, 3);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.copied_unchanged, 1);
    assert_eq!(summary.skipped_malformed, 1);
    assert!(summary.failures.is_empty());

    assert!(output.path().join("42.smet").exists());
    assert!(output.path().join("unmatched.smet").exists());
    assert!(!output.path().join("broken.smet").exists());
}

#[test]
fn test_batch_missing_input_directory_is_error() {
    let output = TempDir::new().unwrap();

    let runner = BatchRunner::new(reconcile_stage(output.path()), false);
    let result = runner.run(&PathBuf::from("/nonexistent/input"));

    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_batch_creates_output_directory() {
    let input = TempDir::new().unwrap();
    let output_root = TempDir::new().unwrap();
    let out_dir = output_root.path().join("nested").join("out");

    write_smet(
        input.path(),
        "matched.smet",
        &[("station_id", "ING_0042"), ("station_name", "Passo Rolle")],
        "1\n",
    );

    let runner = BatchRunner::new(reconcile_stage(&out_dir), false);
    runner.run(input.path()).unwrap();

    assert!(out_dir.join("42.smet").exists());
}

#[test]
fn test_batch_empty_directory_yields_empty_summary() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let runner = BatchRunner::new(reconcile_stage(output.path()), false);
    let summary = runner.run(input.path()).unwrap();

    assert_eq!(summary.files_seen, 0);
    assert_eq!(summary.updated, 0);
    assert!(!summary.needs_attention());
}

#[test]
fn test_discovery_is_sorted_and_smet_only() {
    let input = TempDir::new().unwrap();
    write_smet(input.path(), "b.smet", &[("station_id", "2")], "1\n");
    write_smet(input.path(), "a.smet", &[("station_id", "1")], "1\n");
    fs::write(input.path().join("notes.txt"), "ignored").unwrap();
    fs::write(input.path().join("a.smet.bak"), "ignored").unwrap();

    let files = discover_smet_files(input.path()).unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.smet", "b.smet"]);
}

#[test]
fn test_discovery_does_not_descend_into_subdirectories() {
    let input = TempDir::new().unwrap();
    let nested = input.path().join("nested");
    fs::create_dir_all(&nested).unwrap();
    write_smet(input.path(), "top.smet", &[("station_id", "1")], "1\n");
    write_smet(&nested, "deep.smet", &[("station_id", "2")], "1\n");

    let files = discover_smet_files(input.path()).unwrap();

    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("top.smet"));
}

#[test]
fn test_batch_in_place_stage_reports_per_file_outcomes() {
    let dir = TempDir::new().unwrap();
    write_smet(
        dir.path(),
        "a.smet",
        &[
            ("station_id", "1"),
            ("fields", "TA PSUM"),
            ("units_multiplier", "1 0.1"),
        ],
        "1 2\n",
    );
    write_smet(
        dir.path(),
        "b.smet",
        &[
            ("station_id", "2"),
            ("fields", "TA PSUM"),
            ("units_multiplier", "1 1"),
        ],
        "1 2\n",
    );
    write_smet(
        dir.path(),
        "c.smet",
        &[("station_id", "3"), ("fields", "TA RH")],
        "1 2\n",
    );

    let reconciler = crate::app::services::reconciler::FileReconciler::set_multiplier(
        "PSUM".to_string(),
        "1".to_string(),
        true,
    );
    let summary = BatchRunner::new(reconciler, false).run(dir.path()).unwrap();

    assert_eq!(summary.files_seen, 3);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.skipped_missing_field, 1);
}
