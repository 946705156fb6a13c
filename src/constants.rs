//! Application constants for the SMET reconciler
//!
//! This module contains the SMET format markers, canonical header field
//! names, rendering defaults, and geospatial defaults used throughout the
//! reconciliation pipeline.

use std::path::{Path, PathBuf};

// =============================================================================
// SMET Format Markers
// =============================================================================

/// Marker line that opens the header section
pub const HEADER_MARKER: &str = "[HEADER]";

/// Marker line that opens the data section; this line and everything after
/// it is opaque payload
pub const DATA_MARKER: &str = "[DATA]";

/// Comment prefix inside the header section
pub const COMMENT_PREFIX: char = '#';

/// File extension for SMET station files (without the dot)
pub const SMET_EXTENSION: &str = "smet";

/// Suffix appended to a file's full name for pre-mutation backups
pub const BACKUP_SUFFIX: &str = ".bak";

/// Minimum number of preamble lines expected before `[HEADER]`
/// (the format banner, e.g. `SMET 1.1 ASCII`)
pub const MIN_PREAMBLE_LINES: usize = 1;

// =============================================================================
// Header Rendering
// =============================================================================

/// Column width header keys are left-padded to when rendering
/// (`station_id       = 37`); keys longer than this are never truncated
pub const KEY_COLUMN_WIDTH: usize = 17;

/// Canonical ordering for well-known header fields; fields not listed here
/// keep their original encounter order after these
pub const CANONICAL_FIELD_ORDER: &[&str] = &[
    fields::STATION_ID,
    fields::STATION_NAME,
    fields::LATITUDE,
    fields::LONGITUDE,
    fields::ALTITUDE,
    fields::EASTING,
    fields::NORTHING,
    fields::EPSG,
    fields::PROVIDER_ID,
    fields::NODATA,
    fields::TZ,
    fields::FIELDS,
];

// =============================================================================
// Canonical Header Field Names
// =============================================================================

/// Header field names referenced by the reconciliation pipeline
pub mod fields {
    /// Canonical integer station identifier
    pub const STATION_ID: &str = "station_id";

    /// Natural-key station name used for cross-set matching
    pub const STATION_NAME: &str = "station_name";

    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const ALTITUDE: &str = "altitude";
    pub const EASTING: &str = "easting";
    pub const NORTHING: &str = "northing";

    /// EPSG code of the CRS the easting/northing pair is expressed in
    pub const EPSG: &str = "epsg";

    pub const PROVIDER_ID: &str = "provider_id";
    pub const NODATA: &str = "nodata";
    pub const TZ: &str = "tz";

    /// Space-separated list of measurement channel names
    pub const FIELDS: &str = "fields";

    /// Space-separated scale factors, positionally aligned with `fields`
    pub const UNITS_MULTIPLIER: &str = "units_multiplier";
}

/// Geospatial fields copied from an authority header, all-or-nothing
pub const GEO_COPY_FIELDS: &[&str] = &[
    fields::LATITUDE,
    fields::LONGITUDE,
    fields::EASTING,
    fields::NORTHING,
    fields::ALTITUDE,
];

// =============================================================================
// Geospatial Defaults and Precision
// =============================================================================

/// Coordinate reference system defaults and output precision
pub mod geo {
    /// Default source CRS for reprojection (WGS84 geographic)
    pub const DEFAULT_SOURCE_EPSG: u32 = 4326;

    /// Default target CRS for reprojection (ETRS89-LAEA Europe)
    pub const DEFAULT_TARGET_EPSG: u32 = 3035;

    /// Decimal places for latitude/longitude pass-through
    pub const GEOGRAPHIC_DECIMALS: usize = 8;

    /// Decimal places for projected easting/northing
    pub const PROJECTED_DECIMALS: usize = 6;

    /// Decimal places for altitude
    pub const ALTITUDE_DECIMALS: usize = 1;
}

// =============================================================================
// Stage Defaults
// =============================================================================

/// Default measurement channel targeted by the multiplier stage
pub const DEFAULT_MULTIPLIER_CHANNEL: &str = "PSUM";

/// Default multiplier value written for the targeted channel
pub const DEFAULT_MULTIPLIER_VALUE: &str = "1";

// =============================================================================
// Helper Functions
// =============================================================================

/// Check whether a raw line is the `[HEADER]` marker
pub fn is_header_marker(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(HEADER_MARKER)
}

/// Check whether a raw line is the `[DATA]` marker
pub fn is_data_marker(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(DATA_MARKER)
}

/// Check whether a path looks like a SMET station file
pub fn is_smet_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SMET_EXTENSION))
}

/// Backup sibling for a path (`station.smet` -> `station.smet.bak`)
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Canonical output filename for a station identifier
pub fn canonical_file_name(station_id: &str) -> String {
    format!("{}.{}", station_id, SMET_EXTENSION)
}

/// Check whether a key is a valid header identifier
/// (ASCII alphanumerics and underscores, non-empty)
pub fn is_valid_field_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_detection_is_case_insensitive() {
        assert!(is_header_marker("[HEADER]"));
        assert!(is_header_marker("  [header]  "));
        assert!(is_header_marker("[Header]"));
        assert!(!is_header_marker("[HEADERS]"));

        assert!(is_data_marker("[DATA]"));
        assert!(is_data_marker("\t[data]"));
        assert!(!is_data_marker("[DATA] extra"));
    }

    #[test]
    fn test_backup_path_appends_suffix() {
        let path = Path::new("/tmp/stations/37.smet");
        assert_eq!(
            backup_path(path),
            PathBuf::from("/tmp/stations/37.smet.bak")
        );
    }

    #[test]
    fn test_canonical_file_name() {
        assert_eq!(canonical_file_name("218"), "218.smet");
        assert_eq!(canonical_file_name("AOSTA01"), "AOSTA01.smet");
    }

    #[test]
    fn test_field_name_validation() {
        assert!(is_valid_field_name("station_id"));
        assert!(is_valid_field_name("units_multiplier"));
        assert!(is_valid_field_name("tz"));
        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("station id"));
        assert!(!is_valid_field_name("nome-stazione"));
    }

    #[test]
    fn test_canonical_order_covers_identity_and_geo_fields() {
        for field in GEO_COPY_FIELDS {
            assert!(CANONICAL_FIELD_ORDER.contains(field));
        }
        assert!(CANONICAL_FIELD_ORDER.contains(&fields::STATION_ID));
        assert!(CANONICAL_FIELD_ORDER.contains(&fields::STATION_NAME));
    }
}
