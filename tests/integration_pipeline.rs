//! Integration tests for the reconciliation pipeline
//!
//! These tests drive whole stages through [`BatchRunner`] against temporary
//! directories of SMET files, exercising the full path from table loading
//! through atomic writes, backups and renames.

use smet_reconciler::app::services::reconciler::{BatchRunner, FileReconciler};
use smet_reconciler::app::services::reproject::EtrsLaea;
use smet_reconciler::app::services::station_registry::{
    HeaderAuthority, RemapTable, StationRegistry, station_names_in,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a SMET file with the given header lines and a small data block
fn write_smet(dir: &Path, file_name: &str, header_lines: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(file_name);
    let mut content = String::from("SMET 1.1 ASCII\n[HEADER]\n");
    for (key, value) in header_lines {
        content.push_str(&format!("{key} = {value}\n"));
    }
    content.push_str("[DATA]\n2023-01-01T00:00 1.5 0.0\n2023-01-01T01:00 1.6 0.2\n");
    fs::write(&path, content).unwrap();
    path
}

/// Write a JSON reference table with one authoritative station
fn write_reference_table(dir: &Path, id: i64, name: &str) -> PathBuf {
    let path = dir.join("stations.json");
    let json = format!(
        r#"{{"data": [{{"codice": {id}, "nome_stazione": "{name}", "latitudine": 45.2, "longitudine": 11.5, "quota": 300.0}}]}}"#
    );
    fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_reconcile_directory_end_to_end() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_smet(
        input.path(),
        "rolle_raw.smet",
        &[
            ("station_id", "ingest-007"),
            ("station_name", "Passo Rolle"),
            ("latitude", "45.000000"),
            ("longitude", "11.000000"),
            ("altitude", "250.0"),
            ("fields", "timestamp TA PSUM"),
        ],
    );
    write_smet(
        input.path(),
        "unknown.smet",
        &[("station_id", "99"), ("station_name", "Nowhere")],
    );

    let table = write_reference_table(input.path(), 42, "Passo Rolle");
    // The reference table sits in the input directory but is not a .smet
    // file, so discovery must ignore it.
    let registry = StationRegistry::from_json_file(&table).unwrap();
    let reconciler =
        FileReconciler::reconcile(registry, Box::new(EtrsLaea::new()), output.path().to_path_buf());

    let summary = BatchRunner::new(reconciler, false).run(input.path()).unwrap();

    assert_eq!(summary.files_seen, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.copied_unchanged, 1);
    assert!(summary.failures.is_empty());

    // Matched file lands under its canonical name with reconciled values
    let reconciled = fs::read_to_string(output.path().join("42.smet")).unwrap();
    assert!(reconciled.contains("station_id       = 42\n"));
    assert!(reconciled.contains("latitude         = 45.20000000\n"));
    assert!(reconciled.contains("longitude        = 11.50000000\n"));
    assert!(reconciled.contains("altitude         = 300.0\n"));
    assert!(reconciled.contains("easting          = 4439041.538352\n"));
    assert!(reconciled.contains("northing         = 2455408.585500\n"));
    assert!(reconciled.contains("epsg             = 3035\n"));
    // Data block is untouched
    assert!(reconciled.contains("[DATA]\n2023-01-01T00:00 1.5 0.0\n"));

    // Unmatched file passes through byte-identical under its own name
    let copied = fs::read_to_string(output.path().join("unknown.smet")).unwrap();
    assert!(copied.contains("station_name = Nowhere"));

    // Inputs are never modified by a directory-output stage
    assert!(input.path().join("rolle_raw.smet").exists());
}

#[test]
fn test_reconcile_is_idempotent() {
    let input = TempDir::new().unwrap();
    let output1 = TempDir::new().unwrap();
    let output2 = TempDir::new().unwrap();

    write_smet(
        input.path(),
        "rolle.smet",
        &[("station_id", "7"), ("station_name", "Passo Rolle")],
    );
    let table = write_reference_table(input.path(), 42, "Passo Rolle");

    let registry = StationRegistry::from_json_file(&table).unwrap();
    let first = FileReconciler::reconcile(
        registry.clone(),
        Box::new(EtrsLaea::new()),
        output1.path().to_path_buf(),
    );
    let summary = BatchRunner::new(first, false).run(input.path()).unwrap();
    assert_eq!(summary.updated, 1);

    // Reconciling the reconciled output again yields byte-identical files
    let second = FileReconciler::reconcile(
        registry,
        Box::new(EtrsLaea::new()),
        output2.path().to_path_buf(),
    );
    let summary = BatchRunner::new(second, false).run(output1.path()).unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(
        fs::read_to_string(output1.path().join("42.smet")).unwrap(),
        fs::read_to_string(output2.path().join("42.smet")).unwrap()
    );
}

#[test]
fn test_patch_coords_from_authority_directory() {
    let authority_dir = TempDir::new().unwrap();
    let data_dir = TempDir::new().unwrap();

    write_smet(
        authority_dir.path(),
        "42.smet",
        &[
            ("station_id", "42"),
            ("station_name", "Cermis"),
            ("latitude", "46.29753000"),
            ("longitude", "11.78817000"),
            ("easting", "4446934.123456"),
            ("northing", "2578008.654321"),
            ("altitude", "2004.0"),
        ],
    );
    let target = write_smet(
        data_dir.path(),
        "cermis.smet",
        &[
            ("station_id", "42"),
            ("station_name", "Cermis"),
            ("latitude", "46.3"),
            ("longitude", "11.8"),
            ("easting", "0"),
            ("northing", "0"),
            ("altitude", "2000"),
        ],
    );
    let original = fs::read_to_string(&target).unwrap();

    let (authority, stats) = HeaderAuthority::from_directory(authority_dir.path(), false).unwrap();
    assert_eq!(stats.stations_indexed, 1);

    let reconciler = FileReconciler::patch_coords(authority, None, true);
    let summary = BatchRunner::new(reconciler, false).run(data_dir.path()).unwrap();
    assert_eq!(summary.updated, 1);

    // Geolocation values are copied verbatim, digit for digit
    let patched = fs::read_to_string(&target).unwrap();
    assert!(patched.contains("latitude         = 46.29753000\n"));
    assert!(patched.contains("easting          = 4446934.123456\n"));
    assert!(patched.contains("altitude         = 2004.0\n"));
    // Identity fields are not the patch's business
    assert!(patched.contains("station_name     = Cermis\n"));

    // The backup preserves the pre-edit bytes
    let backup = fs::read_to_string(data_dir.path().join("cermis.smet.bak")).unwrap();
    assert_eq!(backup, original);
}

#[test]
fn test_patch_coords_backup_survives_second_run() {
    let authority_dir = TempDir::new().unwrap();
    let data_dir = TempDir::new().unwrap();

    write_smet(
        authority_dir.path(),
        "42.smet",
        &[
            ("station_id", "42"),
            ("latitude", "46.29753000"),
            ("longitude", "11.78817000"),
            ("easting", "4446934.123456"),
            ("northing", "2578008.654321"),
            ("altitude", "2004.0"),
        ],
    );
    let target = write_smet(
        data_dir.path(),
        "42.smet",
        &[("station_id", "42"), ("latitude", "0"), ("longitude", "0"),
          ("easting", "0"), ("northing", "0"), ("altitude", "0")],
    );
    let original = fs::read_to_string(&target).unwrap();

    let (authority, _) = HeaderAuthority::from_directory(authority_dir.path(), false).unwrap();
    let run = |authority: HeaderAuthority| {
        let reconciler = FileReconciler::patch_coords(authority, None, true);
        BatchRunner::new(reconciler, false).run(data_dir.path()).unwrap()
    };

    let summary = run(authority.clone());
    assert_eq!(summary.updated, 1);

    // Second run is a no-op and must not touch the existing backup
    let summary = run(authority);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.unchanged, 1);
    let backup = fs::read_to_string(data_dir.path().join("42.smet.bak")).unwrap();
    assert_eq!(backup, original);
}

#[test]
fn test_patch_coords_target_ids_filter() {
    let authority_dir = TempDir::new().unwrap();
    let data_dir = TempDir::new().unwrap();

    for id in ["42", "117"] {
        write_smet(
            authority_dir.path(),
            &format!("{id}.smet"),
            &[
                ("station_id", id),
                ("latitude", "46.29753000"),
                ("longitude", "11.78817000"),
                ("easting", "4446934.123456"),
                ("northing", "2578008.654321"),
                ("altitude", "2004.0"),
            ],
        );
        write_smet(
            data_dir.path(),
            &format!("{id}.smet"),
            &[("station_id", id), ("latitude", "0"), ("longitude", "0"),
              ("easting", "0"), ("northing", "0"), ("altitude", "0")],
        );
    }

    let (authority, _) = HeaderAuthority::from_directory(authority_dir.path(), false).unwrap();
    let targets = Some([42i64].into_iter().collect());
    let reconciler = FileReconciler::patch_coords(authority, targets, false);
    let summary = BatchRunner::new(reconciler, false).run(data_dir.path()).unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.skipped_no_match, 1);
    let untouched = fs::read_to_string(data_dir.path().join("117.smet")).unwrap();
    assert!(untouched.contains("latitude = 0"));
}

#[test]
fn test_remap_ids_from_csv_table() {
    let dir = TempDir::new().unwrap();

    let table_path = dir.path().join("remap.csv");
    fs::write(
        &table_path,
        "ingestion_id,station_id\n0007.0,42\nother,117\n",
    )
    .unwrap();

    let old = write_smet(
        dir.path(),
        "seasonal_export.smet",
        &[("station_id", "7"), ("station_name", "Passo Rolle")],
    );

    let table = RemapTable::from_csv_file(&table_path, "ingestion_id", "station_id").unwrap();
    assert_eq!(table.mapping_count(), 2);

    let reconciler = FileReconciler::remap_ids(table, true);
    let summary = BatchRunner::new(reconciler, false).run(dir.path()).unwrap();
    assert_eq!(summary.updated, 1);

    // Rewritten in place, then renamed to the canonical id
    assert!(!old.exists());
    let remapped = fs::read_to_string(dir.path().join("42.smet")).unwrap();
    assert!(remapped.contains("station_id       = 42\n"));
    // Backup sits beside the original name
    assert!(dir.path().join("seasonal_export.smet.bak").exists());
}

#[test]
fn test_remap_rename_collision_leaves_occupant_alone() {
    let dir = TempDir::new().unwrap();

    let table_path = dir.path().join("remap.csv");
    fs::write(&table_path, "ingestion_id,station_id\n7,42\n").unwrap();

    write_smet(dir.path(), "incoming.smet", &[("station_id", "7")]);
    write_smet(dir.path(), "42.smet", &[("station_id", "42"), ("station_name", "Occupant")]);
    let occupant_before = fs::read_to_string(dir.path().join("42.smet")).unwrap();

    let table = RemapTable::from_csv_file(&table_path, "ingestion_id", "station_id").unwrap();
    let reconciler = FileReconciler::remap_ids(table, false);
    let summary = BatchRunner::new(reconciler, false).run(dir.path()).unwrap();

    assert_eq!(summary.renames_declined, 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("42.smet")).unwrap(),
        occupant_before
    );
    // The remapped header stays under the original name
    let stranded = fs::read_to_string(dir.path().join("incoming.smet")).unwrap();
    assert!(stranded.contains("station_id       = 42\n"));
}

#[test]
fn test_set_multiplier_preserves_other_tokens() {
    let dir = TempDir::new().unwrap();

    let path = write_smet(
        dir.path(),
        "42.smet",
        &[
            ("station_id", "42"),
            ("fields", "timestamp TA PSUM"),
            ("units_multiplier", "1 0.1 0.5"),
        ],
    );

    let reconciler = FileReconciler::set_multiplier("PSUM".to_string(), "1".to_string(), false);
    let summary = BatchRunner::new(reconciler, false).run(dir.path()).unwrap();
    assert_eq!(summary.updated, 1);

    let edited = fs::read_to_string(&path).unwrap();
    assert!(edited.contains("units_multiplier = 1 0.1 1\n"));

    // A second run finds the value already in place
    let reconciler = FileReconciler::set_multiplier("PSUM".to_string(), "1".to_string(), false);
    let summary = BatchRunner::new(reconciler, false).run(dir.path()).unwrap();
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.unchanged, 1);
}

#[test]
fn test_malformed_file_is_never_written() {
    let dir = TempDir::new().unwrap();

    let path = dir.path().join("broken.smet");
    fs::write(&path, "SMET 1.1 ASCII\nno header marker here\n").unwrap();

    let reconciler = FileReconciler::set_multiplier("PSUM".to_string(), "1".to_string(), true);
    let summary = BatchRunner::new(reconciler, false).run(dir.path()).unwrap();

    assert_eq!(summary.skipped_malformed, 1);
    assert_eq!(summary.updated, 0);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "SMET 1.1 ASCII\nno header marker here\n"
    );
    assert!(!dir.path().join("broken.smet.bak").exists());
}

#[test]
fn test_rename_collision_between_two_sources() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    // Two exports of the same station; discovery order is lexicographic
    write_smet(input.path(), "a_export.smet", &[("station_id", "42"), ("station_name", "First")]);
    write_smet(input.path(), "b_export.smet", &[("station_id", "42"), ("station_name", "Second")]);

    let reconciler = FileReconciler::rename_by_id(output.path().to_path_buf());
    let summary = BatchRunner::new(reconciler, false).run(input.path()).unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.renames_declined, 1);
    let kept = fs::read_to_string(output.path().join("42.smet")).unwrap();
    assert!(kept.contains("station_name = First"));
}

#[test]
fn test_filter_by_reference_directory() {
    let reference = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_smet(
        reference.path(),
        "42.smet",
        &[("station_id", "42"), ("station_name", "Cermis")],
    );
    write_smet(
        input.path(),
        "keep.smet",
        &[("station_id", "7"), ("station_name", "Cermis")],
    );
    write_smet(
        input.path(),
        "drop.smet",
        &[("station_id", "8"), ("station_name", "Elsewhere")],
    );

    let names = station_names_in(reference.path()).unwrap();
    assert!(names.contains("Cermis"));

    let reconciler = FileReconciler::filter_by_name(names, output.path().to_path_buf());
    let summary = BatchRunner::new(reconciler, false).run(input.path()).unwrap();

    assert_eq!(summary.copied_unchanged, 1);
    assert_eq!(summary.skipped_no_match, 1);
    // Name survives the copy; the filter never rewrites content
    assert!(output.path().join("keep.smet").exists());
    assert!(!output.path().join("drop.smet").exists());
}
