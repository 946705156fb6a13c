//! Station registry service for authoritative metadata lookups
//!
//! This module loads reference metadata into memory and resolves source
//! records to authoritative [`StationRecord`]s by station name or station
//! id. Matching is exact and case-sensitive; a missed lookup is not an
//! error - it signals "pass through unchanged" to the reconciler.
//!
//! Three reference sources are supported:
//! - [`loader`] - a JSON ingestion table (records keyed by station name)
//!   and a CSV id-remapping table
//! - [`scan`] - an authority file set: a directory of SMET files indexed by
//!   their embedded `station_id` header line

use crate::app::models::StationRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub mod loader;
pub mod scan;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use scan::{HeaderAuthority, ScanStats, station_names_in};

/// Station registry providing O(1) metadata lookups by name and by id
///
/// Built once from a reference table and read-only for the duration of a
/// reconciliation run.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    /// Authoritative records in load order
    pub(crate) records: Vec<StationRecord>,

    /// Index from station name into `records`
    pub(crate) by_name: HashMap<String, usize>,

    /// Index from station id into `records`
    pub(crate) by_id: HashMap<i64, usize>,

    /// Path of the reference table this registry was loaded from
    pub(crate) source: PathBuf,

    /// Rows of the reference table that were skipped during loading
    pub(crate) rows_discarded: usize,
}

impl StationRegistry {
    /// Create a new empty station registry
    pub fn new(source: PathBuf) -> Self {
        Self {
            records: Vec::new(),
            by_name: HashMap::new(),
            by_id: HashMap::new(),
            source,
            rows_discarded: 0,
        }
    }

    /// Add a record, rejecting duplicates
    ///
    /// Returns `false` when the record's name or id is already indexed; the
    /// first occurrence wins and the new record is dropped.
    pub fn insert(&mut self, record: StationRecord) -> bool {
        if self.by_name.contains_key(&record.station_name)
            || self.by_id.contains_key(&record.station_id)
        {
            return false;
        }

        let index = self.records.len();
        self.by_name.insert(record.station_name.clone(), index);
        self.by_id.insert(record.station_id, index);
        self.records.push(record);
        true
    }

    /// Resolve a record by station name (exact, case-sensitive)
    pub fn by_name(&self, station_name: &str) -> Option<&StationRecord> {
        self.by_name
            .get(station_name)
            .and_then(|&index| self.records.get(index))
    }

    /// Resolve a record by station id
    pub fn by_id(&self, station_id: i64) -> Option<&StationRecord> {
        self.by_id
            .get(&station_id)
            .and_then(|&index| self.records.get(index))
    }

    /// Check if a station name exists in the registry
    pub fn contains_name(&self, station_name: &str) -> bool {
        self.by_name.contains_key(station_name)
    }

    /// Check if a station id exists in the registry
    pub fn contains_id(&self, station_id: i64) -> bool {
        self.by_id.contains_key(&station_id)
    }

    /// Total number of stations in the registry
    pub fn station_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in load order
    pub fn iter(&self) -> impl Iterator<Item = &StationRecord> + '_ {
        self.records.iter()
    }

    /// Path of the reference table this registry was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Rows of the reference table skipped during loading
    pub fn rows_discarded(&self) -> usize {
        self.rows_discarded
    }
}

/// Mapping from a source identifier to a canonical station id
///
/// Loaded from a two-column CSV table; ids are opaque strings on both
/// sides (numeric-looking cells are normalized, `0042.0` -> `42`).
#[derive(Debug, Clone)]
pub struct RemapTable {
    pub(crate) map: HashMap<String, String>,
    pub(crate) source: PathBuf,
}

impl RemapTable {
    /// Resolve a source identifier to its canonical station id
    pub fn lookup(&self, source_id: &str) -> Option<&str> {
        self.map.get(source_id).map(String::as_str)
    }

    /// Number of mappings in the table
    pub fn mapping_count(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Path of the CSV table this mapping was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }
}
