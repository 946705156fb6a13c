//! Test utilities and fixtures for SMET codec testing
//!
//! This module provides document fixtures shared across the parser, header,
//! and render test modules.

mod render_tests;

/// Helper to create a complete, canonically formatted SMET document
///
/// Keys are padded to the canonical column width and well-known fields
/// appear in canonical order, so this document round-trips byte-identical
/// through parse + render.
pub fn create_canonical_smet() -> String {
    "SMET 1.1 ASCII\n\
     [HEADER]\n\
     station_id       = 37\n\
     station_name     = COGNE\n\
     latitude         = 45.60809000\n\
     longitude        = 7.35837000\n\
     altitude         = 1682.0\n\
     easting          = 4108455.123456\n\
     northing         = 2430441.654321\n\
     epsg             = 3035\n\
     nodata           = -999\n\
     tz               = 1\n\
     fields           = timestamp TA RH PSUM\n\
     units_multiplier = 1 1 0.1\n\
     [DATA]\n\
     2023-01-01T00:00 270.15 0.75 0.0\n\
     2023-01-01T01:00 269.95 0.78 0.2\n"
        .to_string()
}

/// Helper to create a SMET document with loose header formatting
///
/// Mixed marker case, uneven whitespace around `=`, a comment, a blank
/// line, and two lines the tolerant parser must ignore.
pub fn create_loose_smet() -> String {
    "SMET 1.1 ASCII\n\
     \x20 [header]\n\
     # provider export 2023-04\n\
     station_id=37\n\
     station_name   =    COGNE\n\
     \n\
     altitude =1682.0\n\
     not a field line\n\
     nome-stazione = ignored\n\
     [data]\n\
     1 2 3\n"
        .to_string()
}

/// Helper to create a minimal valid SMET document
pub fn create_minimal_smet() -> String {
    "SMET 1.1 ASCII\n[HEADER]\nstation_id = 1\n[DATA]\n0 0\n".to_string()
}
