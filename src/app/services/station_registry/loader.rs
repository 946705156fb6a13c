//! Loading of reference tables from disk
//!
//! Two table shapes are supported: the JSON ingestion export
//! (`{"data": [{"codice", "nome_stazione", "latitudine", ...}]}`) and a
//! plain CSV id-remapping table. Both loaders are tolerant of bad rows
//! (warn and skip) but fail hard when the table itself is unreadable or
//! yields nothing usable.

use crate::app::models::StationRecord;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{RemapTable, StationRegistry};

/// Top-level shape of the JSON ingestion export
#[derive(Debug, Deserialize)]
struct RawStationTable {
    data: Vec<RawStationRow>,
}

/// One row of the ingestion export, before validation
///
/// Field types in real exports are unreliable (`codice` arrives as a
/// number in some dumps and a string in others), so everything numeric is
/// kept as a raw [`Value`] and coerced during conversion. Key spellings
/// drift across export generations too: the station id appears as
/// `codice` or `codice_stazione`, the elevation as `quota` or `altitude`.
#[derive(Debug, Deserialize)]
struct RawStationRow {
    #[serde(default, alias = "codice_stazione")]
    codice: Option<Value>,
    #[serde(default)]
    nome_stazione: Option<String>,
    #[serde(default)]
    latitudine: Option<Value>,
    #[serde(default)]
    longitudine: Option<Value>,
    #[serde(default, alias = "altitude")]
    quota: Option<Value>,
}

impl RawStationRow {
    /// Convert a raw row into a typed record, naming the first defect
    fn into_record(self) -> std::result::Result<StationRecord, &'static str> {
        let station_name = self
            .nome_stazione
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or("missing 'nome_stazione'")?;

        let station_id = self
            .codice
            .as_ref()
            .and_then(parse_station_id)
            .ok_or("missing or non-numeric 'codice'")?;

        let latitude = self
            .latitudine
            .as_ref()
            .and_then(parse_number)
            .ok_or("missing or non-numeric 'latitudine'")?;

        let longitude = self
            .longitudine
            .as_ref()
            .and_then(parse_number)
            .ok_or("missing or non-numeric 'longitudine'")?;

        let altitude = self
            .quota
            .as_ref()
            .and_then(parse_number)
            .ok_or("missing or non-numeric 'quota'")?;

        Ok(StationRecord {
            station_id,
            station_name,
            latitude,
            longitude,
            altitude,
            easting: None,
            northing: None,
            epsg: None,
        })
    }
}

/// Coerce a JSON value into a station id
fn parse_station_id(value: &Value) -> Option<i64> {
    if let Some(id) = value.as_i64() {
        return Some(id);
    }
    if let Some(raw) = value.as_str() {
        return raw.trim().parse().ok();
    }
    // Some exports serialize ids as floats (42.0)
    value
        .as_f64()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
}

/// Coerce a JSON value into a finite f64
fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

impl StationRegistry {
    /// Load a registry from a JSON ingestion export
    ///
    /// Bad rows are skipped with a warning; an unreadable table or a table
    /// with no usable rows is an error.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        info!("Loading station reference table from {}", path.display());

        if !path.exists() {
            return Err(Error::registry(format!(
                "reference table does not exist: {}",
                path.display()
            )));
        }

        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read '{}'", path.display()), e))?;

        let table: RawStationTable = serde_json::from_str(&text).map_err(|e| {
            Error::json_parsing(
                path.display().to_string(),
                "reference table is not valid JSON",
                Some(e),
            )
        })?;

        let total_rows = table.data.len();
        let mut registry = Self::new(path.to_path_buf());

        for (row_number, row) in table.data.into_iter().enumerate() {
            let record = match row.into_record() {
                Ok(record) => record,
                Err(reason) => {
                    warn!(
                        "Skipping row {} of '{}': {}",
                        row_number,
                        path.display(),
                        reason
                    );
                    registry.rows_discarded += 1;
                    continue;
                }
            };

            if let Err(e) = record.validate() {
                warn!("Skipping station '{}': {}", record.station_name, e);
                registry.rows_discarded += 1;
                continue;
            }

            let station_name = record.station_name.clone();
            let station_id = record.station_id;
            if !registry.insert(record) {
                warn!(
                    "Duplicate station '{}' (id {}) in reference table, keeping first occurrence",
                    station_name, station_id
                );
                registry.rows_discarded += 1;
            }
        }

        if registry.is_empty() {
            return Err(Error::registry(format!(
                "no usable station records in '{}' ({} rows discarded)",
                path.display(),
                registry.rows_discarded
            )));
        }

        info!(
            "Loaded {} stations from {} rows ({} discarded)",
            registry.station_count(),
            total_rows,
            registry.rows_discarded
        );

        Ok(registry)
    }
}

impl RemapTable {
    /// Load an id-remapping table from a two-column CSV file
    ///
    /// Column headers are matched case-insensitively. Rows with an empty
    /// source or target cell are skipped; on a duplicate source id the
    /// first mapping wins.
    pub fn from_csv_file(path: &Path, from_column: &str, to_column: &str) -> Result<Self> {
        info!("Loading id remap table from {}", path.display());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                Error::csv_parsing(
                    path.display().to_string(),
                    "failed to open remap table",
                    Some(e),
                )
            })?;

        let headers = reader
            .headers()
            .map_err(|e| {
                Error::csv_parsing(
                    path.display().to_string(),
                    "failed to read remap table headers",
                    Some(e),
                )
            })?
            .clone();

        let column_index = |wanted: &str| {
            headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(wanted))
        };

        let from_index = column_index(from_column).ok_or_else(|| {
            Error::csv_parsing(
                path.display().to_string(),
                format!("missing column '{from_column}'"),
                None,
            )
        })?;

        let to_index = column_index(to_column).ok_or_else(|| {
            Error::csv_parsing(
                path.display().to_string(),
                format!("missing column '{to_column}'"),
                None,
            )
        })?;

        let mut map = HashMap::new();

        for (row_number, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                Error::csv_parsing(
                    path.display().to_string(),
                    format!("failed to read row {}", row_number + 1),
                    Some(e),
                )
            })?;

            let Some(from_id) = record.get(from_index).and_then(normalize_id) else {
                debug!("Row {} has no source id, skipping", row_number + 1);
                continue;
            };
            let Some(to_id) = record.get(to_index).and_then(normalize_id) else {
                debug!("Row {} has no target id, skipping", row_number + 1);
                continue;
            };

            match map.entry(from_id) {
                Entry::Vacant(slot) => {
                    slot.insert(to_id);
                }
                Entry::Occupied(existing) => {
                    warn!(
                        "Duplicate source id '{}' in remap table, keeping first occurrence",
                        existing.key()
                    );
                }
            }
        }

        if map.is_empty() {
            return Err(Error::registry(format!(
                "no usable mappings in '{}'",
                path.display()
            )));
        }

        info!("Loaded {} id mappings", map.len());

        Ok(Self {
            map,
            source: path.to_path_buf(),
        })
    }
}

/// Normalize an id cell to its canonical string form
///
/// Spreadsheet exports render integer ids as `1234.0`; those collapse to
/// `1234`. Anything non-numeric passes through trimmed and unchanged.
fn normalize_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value.to_string());
    }
    if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() && value.fract() == 0.0 {
            return Some(format!("{}", value as i64));
        }
    }
    Some(raw.to_string())
}
