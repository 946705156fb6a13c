//! Shared test utilities and fixtures for station registry tests

use crate::app::models::StationRecord;
use std::fs;
use std::path::{Path, PathBuf};


/// Create a test record with typed coordinates
pub fn create_test_record(
    station_id: i64,
    station_name: &str,
    latitude: f64,
    longitude: f64,
    altitude: f64,
) -> StationRecord {
    StationRecord::new(
        station_id,
        station_name.to_string(),
        latitude,
        longitude,
        altitude,
    )
    .unwrap()
}

/// Write a reference table in the JSON ingestion export shape
///
/// Contains three loadable rows exercising every `codice` encoding
/// (string, integer, float) plus four defective rows: missing name,
/// missing codice, duplicate name, unparseable latitude.
pub fn write_reference_json(dir: &Path) -> std::io::Result<PathBuf> {
    let path = dir.join("stations.json");
    let content = r#"{
  "data": [
    {"codice": "42", "nome_stazione": "Passo Rolle", "latitudine": 46.29753, "longitudine": 11.78817, "quota": 2004.0},
    {"codice": 273, "nome_stazione": "Malga Bissina", "latitudine": "46.07744", "longitudine": "10.50321", "quota": 1780},
    {"codice": 19.0, "nome_stazione": "Cima Paganella", "latitudine": 46.14278, "longitudine": 11.03861, "quota": 2125.0},
    {"nome_stazione": "Senza Codice", "latitudine": 45.0, "longitudine": 11.0, "quota": 100.0},
    {"codice": 99, "latitudine": 45.5, "longitudine": 11.5, "quota": 200.0},
    {"codice": 500, "nome_stazione": "Passo Rolle", "latitudine": 40.0, "longitudine": 9.0, "quota": 1500.0},
    {"codice": 777, "nome_stazione": "Brutta Latitudine", "latitudine": "n/a", "longitudine": 11.0, "quota": 90.0}
  ]
}
"#;
    fs::write(&path, content)?;
    Ok(path)
}

/// Write a two-column id remap table as CSV
///
/// Exercises float-normalized cells (`0007.0` -> `7`), a duplicate source
/// id, and rows with an empty cell on either side.
pub fn write_remap_csv(dir: &Path) -> std::io::Result<PathBuf> {
    let path = dir.join("remap.csv");
    let content = "INGESTION_ID,station_id\n\
                   ING_001,42\n\
                   0007.0,173.0\n\
                   ING_001,99\n\
                   BARE,\n\
                   ,55\n\
                   8,21\n";
    fs::write(&path, content)?;
    Ok(path)
}

/// Write a minimal SMET file with the given header lines
pub fn write_smet(
    dir: &Path,
    file_name: &str,
    header_lines: &[(&str, &str)],
) -> std::io::Result<PathBuf> {
    let path = dir.join(file_name);
    let mut content = String::from("SMET 1.1 ASCII\n[HEADER]\n");
    for (key, value) in header_lines {
        content.push_str(&format!("{key} = {value}\n"));
    }
    content.push_str("[DATA]\n2023-01-01T00:00 1.5\n");
    fs::write(&path, content)?;
    Ok(path)
}
