//! Shared fixtures for reconciler tests

use crate::app::models::StationRecord;
use crate::app::services::reproject::EtrsLaea;
use crate::app::services::smet_codec::HeaderMap;
use crate::app::services::station_registry::{HeaderAuthority, RemapTable, StationRegistry};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::FileReconciler;

pub mod batch_tests;

/// Write a SMET file with the given header lines and data rows
pub fn write_smet(
    dir: &Path,
    file_name: &str,
    header_lines: &[(&str, &str)],
    data_rows: &str,
) -> PathBuf {
    let path = dir.join(file_name);
    let mut content = String::from("SMET 1.1 ASCII\n[HEADER]\n");
    for (key, value) in header_lines {
        content.push_str(&format!("{key} = {value}\n"));
    }
    content.push_str("[DATA]\n");
    content.push_str(data_rows);
    fs::write(&path, content).unwrap();
    path
}

/// Reconcile stage against a one-station registry (Passo Rolle, id 42)
pub fn reconcile_stage(out_dir: &Path) -> FileReconciler {
    let mut registry = StationRegistry::new(PathBuf::from("/test/stations.json"));
    registry.insert(StationRecord::new(42, "Passo Rolle".to_string(), 45.2, 11.5, 300.0).unwrap());

    FileReconciler::reconcile(registry, Box::new(EtrsLaea::new()), out_dir.to_path_buf())
}

/// Authority set holding one station's header
pub fn authority_with(station_id: i64, values: &[(&str, &str)]) -> HeaderAuthority {
    let mut headers = HashMap::new();
    headers.insert(station_id, HeaderMap::from_iter(values.iter().copied()));

    HeaderAuthority {
        headers,
        source: PathBuf::from("/test/authority"),
    }
}

/// Authority geolocation block with distinctive verbatim strings
pub fn authority_geo_values() -> Vec<(&'static str, &'static str)> {
    vec![
        ("latitude", "46.29753000"),
        ("longitude", "11.78817000"),
        ("easting", "4446934.123456"),
        ("northing", "2578008.654321"),
        ("altitude", "2004.0"),
    ]
}

/// Remap table from literal pairs
pub fn remap_with(pairs: &[(&str, &str)]) -> RemapTable {
    RemapTable {
        map: pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect(),
        source: PathBuf::from("/test/remap.csv"),
    }
}
