//! Data models for SMET reconciliation
//!
//! This module contains the core data structures for representing
//! authoritative station metadata, per-file reconciliation outcomes, and the
//! end-of-run batch summary.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Station Metadata Structure
// =============================================================================

/// Authoritative station metadata record
///
/// One entry of the reference table used as the source of truth when
/// overwriting a file's header fields. Loaded from an external metadata
/// table and immutable for the duration of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationRecord {
    /// Canonical station identifier - primary key for by-id lookups
    pub station_id: i64,

    /// Station name - natural key for cross-set matching (exact, case-sensitive)
    pub station_name: String,

    /// Latitude in WGS84 decimal degrees
    pub latitude: f64,

    /// Longitude in WGS84 decimal degrees
    pub longitude: f64,

    /// Elevation above sea level in meters
    pub altitude: f64,

    /// Projected easting in the CRS named by `epsg` (derived, may be absent
    /// until computed)
    #[serde(default)]
    pub easting: Option<f64>,

    /// Projected northing in the CRS named by `epsg` (derived, may be absent
    /// until computed)
    #[serde(default)]
    pub northing: Option<f64>,

    /// EPSG code of the CRS `easting`/`northing` are expressed in
    #[serde(default)]
    pub epsg: Option<u32>,
}

impl StationRecord {
    /// Create a new StationRecord with validation
    pub fn new(
        station_id: i64,
        station_name: String,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<Self> {
        let record = Self {
            station_id,
            station_name,
            latitude,
            longitude,
            altitude,
            easting: None,
            northing: None,
            epsg: None,
        };

        record.validate()?;
        Ok(record)
    }

    /// Validate record data for consistency and valid ranges
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::registry(format!(
                "invalid latitude {} for station '{}': must be between -90 and 90 degrees",
                self.latitude, self.station_name
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::registry(format!(
                "invalid longitude {} for station '{}': must be between -180 and 180 degrees",
                self.longitude, self.station_name
            )));
        }

        if self.station_name.trim().is_empty() {
            return Err(Error::registry(format!(
                "station {} has an empty name",
                self.station_id
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Per-File Reconciliation Outcome
// =============================================================================

/// Terminal state of reconciling a single file
///
/// Outcomes are reporting signals only; one file's outcome never affects
/// another file's processing. Skips carry the specific missing or invalid
/// item so no file is dropped silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Header rewritten (and possibly renamed) at the output location
    Updated,

    /// Merge computed a no-op; the file was already at the target state and
    /// was not rewritten
    Unchanged,

    /// No authoritative match; file copied unchanged to the output location
    CopiedUnchanged,

    /// No authoritative match; file skipped
    SkippedNoMatch,

    /// Header could not be parsed, or the lookup key is missing entirely
    SkippedMalformed(String),

    /// The authority or the header lacks required fields, or two parallel
    /// declarations disagree in length; no partial merge was applied
    SkippedMissingField(String),

    /// The canonical target filename is already occupied by a different
    /// file; nothing was written
    RenameDeclined(PathBuf),
}

impl ReconcileOutcome {
    /// Whether this outcome left the input without a reconciled output
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::SkippedNoMatch | Self::SkippedMalformed(_) | Self::SkippedMissingField(_)
        )
    }

    /// Whether this outcome needs operator attention
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::RenameDeclined(_))
    }

    /// Short lowercase label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::CopiedUnchanged => "copied unchanged",
            Self::SkippedNoMatch => "skipped (no match)",
            Self::SkippedMalformed(_) => "skipped (malformed)",
            Self::SkippedMissingField(_) => "skipped (missing field)",
            Self::RenameDeclined(_) => "rename declined",
        }
    }
}

impl std::fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkippedMalformed(reason) => write!(f, "skipped (malformed: {})", reason),
            Self::SkippedMissingField(fields) => {
                write!(f, "skipped (missing field: {})", fields)
            }
            Self::RenameDeclined(target) => {
                write!(f, "rename declined (target exists: {})", target.display())
            }
            other => f.write_str(other.label()),
        }
    }
}

// =============================================================================
// Batch Summary
// =============================================================================

/// Accumulated counters and diagnostics for one batch run
///
/// The only aggregate signal a run produces: per-outcome counts plus the
/// list of per-file failures that were skipped over.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Number of candidate files enumerated
    pub files_seen: usize,

    pub updated: usize,
    pub unchanged: usize,
    pub copied_unchanged: usize,
    pub skipped_no_match: usize,
    pub skipped_malformed: usize,
    pub skipped_missing_field: usize,
    pub renames_declined: usize,

    /// Per-file I/O or projection failures the run skipped over
    pub failures: Vec<(PathBuf, String)>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            files_seen: 0,
            updated: 0,
            unchanged: 0,
            copied_unchanged: 0,
            skipped_no_match: 0,
            skipped_malformed: 0,
            skipped_missing_field: 0,
            renames_declined: 0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Record one file's terminal outcome
    pub fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Updated => self.updated += 1,
            ReconcileOutcome::Unchanged => self.unchanged += 1,
            ReconcileOutcome::CopiedUnchanged => self.copied_unchanged += 1,
            ReconcileOutcome::SkippedNoMatch => self.skipped_no_match += 1,
            ReconcileOutcome::SkippedMalformed(_) => self.skipped_malformed += 1,
            ReconcileOutcome::SkippedMissingField(_) => self.skipped_missing_field += 1,
            ReconcileOutcome::RenameDeclined(_) => self.renames_declined += 1,
        }
    }

    /// Record a per-file failure the run skipped over
    pub fn record_failure(&mut self, path: &Path, error: &Error) {
        self.failures.push((path.to_path_buf(), error.to_string()));
    }

    /// Total files skipped without producing an output
    pub fn total_skipped(&self) -> usize {
        self.skipped_no_match + self.skipped_malformed + self.skipped_missing_field
    }

    /// Whether anything in the run needs operator attention
    pub fn needs_attention(&self) -> bool {
        self.renames_declined > 0 || !self.failures.is_empty()
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}
