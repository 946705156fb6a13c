//! Authority scan: index a directory of SMET files by station id
//!
//! The coordinate-patching stage treats one file set as authoritative and
//! copies its geolocation header values verbatim into another set. To keep
//! that copy lossless the scan retains the raw [`HeaderMap`] of every
//! authority file rather than re-parsing values into floats.

use crate::app::services::smet_codec::{HeaderMap, SmetFile};
use crate::constants;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Headers of an authority file set, indexed by numeric station id
#[derive(Debug, Clone)]
pub struct HeaderAuthority {
    pub(crate) headers: HashMap<i64, HeaderMap>,

    /// Directory the authority set was scanned from
    pub(crate) source: PathBuf,
}

/// Statistics gathered while scanning an authority directory
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// SMET files visited during the scan
    pub files_scanned: usize,

    /// Files indexed under a numeric station id
    pub stations_indexed: usize,

    /// Files whose header carries no numeric `station_id`
    pub files_without_id: usize,

    /// Per-file scan failures (path and reason)
    pub errors: Vec<String>,

    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl HeaderAuthority {
    /// Scan a directory tree of SMET files and index their headers
    ///
    /// The scan is recursive; nested provider subdirectories are common in
    /// authority exports. Unreadable or malformed files are recorded in the
    /// returned [`ScanStats`] and skipped. When two files carry the same
    /// station id the first one scanned wins.
    pub fn from_directory(dir: &Path, show_progress: bool) -> Result<(Self, ScanStats)> {
        info!("Scanning authority headers from {}", dir.display());

        if !dir.is_dir() {
            return Err(Error::registry(format!(
                "authority directory does not exist: {}",
                dir.display()
            )));
        }

        let start_time = Instant::now();
        let mut stats = ScanStats::new();

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if constants::is_smet_file(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    stats.errors.push(e.to_string());
                }
            }
        }
        files.sort();

        let progress_bar = if show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb.set_message("Scanning authority files...");
            Some(pb)
        } else {
            None
        };

        let mut headers: HashMap<i64, HeaderMap> = HashMap::new();

        for (file_index, path) in files.iter().enumerate() {
            if let Some(pb) = &progress_bar {
                pb.set_position(file_index as u64);
                pb.set_message(format!(
                    "Scanning {}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                ));
            }

            match SmetFile::read(path) {
                Ok(smet) => match smet.station_id_numeric() {
                    Some(station_id) => match headers.entry(station_id) {
                        Entry::Vacant(slot) => {
                            slot.insert(smet.header);
                            stats.stations_indexed += 1;
                        }
                        Entry::Occupied(_) => {
                            warn!(
                                "Duplicate station id {} in authority set ({}), keeping first occurrence",
                                station_id,
                                path.display()
                            );
                        }
                    },
                    None => {
                        warn!(
                            "Authority file {} has no numeric station_id, skipping",
                            path.display()
                        );
                        stats.files_without_id += 1;
                    }
                },
                Err(e) => {
                    warn!("Failed to scan authority file {}: {}", path.display(), e);
                    stats.errors.push(format!("{}: {}", path.display(), e));
                }
            }
        }

        if let Some(pb) = &progress_bar {
            pb.finish_with_message("Authority scan complete");
        }

        stats.files_scanned = files.len();
        stats.scan_duration = start_time.elapsed();

        if headers.is_empty() {
            return Err(Error::registry(format!(
                "no usable station headers under '{}' ({} files scanned)",
                dir.display(),
                stats.files_scanned
            )));
        }

        info!(
            "Authority scan complete: {} stations from {} files in {:.2}s",
            stats.stations_indexed,
            stats.files_scanned,
            stats.scan_duration.as_secs_f64()
        );

        Ok((
            Self {
                headers,
                source: dir.to_path_buf(),
            },
            stats,
        ))
    }

    /// Header of the authority file for a station id
    pub fn get(&self, station_id: i64) -> Option<&HeaderMap> {
        self.headers.get(&station_id)
    }

    pub fn contains(&self, station_id: i64) -> bool {
        self.headers.contains_key(&station_id)
    }

    /// Number of stations indexed by the scan
    pub fn station_count(&self) -> usize {
        self.headers.len()
    }

    /// Directory the authority set was scanned from
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Collect the distinct station names under a directory of SMET files
///
/// Builds the keep-set for the filter stage from a reference directory.
/// Files that cannot be parsed or carry no `station_name` are skipped with
/// a warning; a directory yielding no names at all is an error.
pub fn station_names_in(dir: &Path) -> Result<HashSet<String>> {
    if !dir.is_dir() {
        return Err(Error::registry(format!(
            "reference directory does not exist: {}",
            dir.display()
        )));
    }

    let mut names = HashSet::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !constants::is_smet_file(entry.path()) {
            continue;
        }

        match SmetFile::read(entry.path()) {
            Ok(smet) => match smet.station_name() {
                Some(name) => {
                    names.insert(name.to_string());
                }
                None => {
                    warn!(
                        "Reference file {} has no station_name, skipping",
                        entry.path().display()
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read reference file {}: {}",
                    entry.path().display(),
                    e
                );
            }
        }
    }

    if names.is_empty() {
        return Err(Error::registry(format!(
            "no station names found under '{}'",
            dir.display()
        )));
    }

    info!("Collected {} station names from {}", names.len(), dir.display());

    Ok(names)
}
