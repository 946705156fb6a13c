//! SMET codec for station observation files
//!
//! This module parses and renders the `[HEADER]`/`[DATA]` two-section SMET
//! text layout. Parsing is a single-pass state machine (preamble -> header ->
//! tail) tracking byte offsets, so the preamble and the data payload are
//! exact byte slices of the input. The payload, from the `[DATA]` marker line
//! to end of file, is never interpreted and is reproduced byte-identical on
//! render.
//!
//! ## Architecture
//!
//! - [`parser`] - Single-pass parsing of raw text into a [`SmetFile`]
//! - [`header`] - Insertion-ordered header field map
//! - [`render`] - Canonical-width serialization back to text
//!
//! ## Usage
//!
//! ```rust
//! use smet_reconciler::app::services::smet_codec::SmetFile;
//! use std::path::Path;
//!
//! # fn example() -> smet_reconciler::Result<()> {
//! let text = "SMET 1.1 ASCII\n[HEADER]\nstation_id = 37\n[DATA]\n1 2 3\n";
//! let smet = SmetFile::parse(text, Path::new("37.smet"))?;
//!
//! assert_eq!(smet.header.get("station_id"), Some("37"));
//! assert_eq!(smet.tail, "[DATA]\n1 2 3\n");
//! # Ok(())
//! # }
//! ```

pub mod header;
pub mod parser;
pub mod render;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use header::HeaderMap;
pub use parser::parse;
pub use render::render;

use crate::Result;
use crate::constants::{self, fields};
use std::path::{Path, PathBuf};

/// A SMET file held in memory during reconciliation
///
/// Carries the origin path, the verbatim preamble bytes (everything before
/// the `[HEADER]` marker line), the parsed header fields, and the verbatim
/// tail bytes (the `[DATA]` marker line and everything after it).
/// Constructed on read, mutated during reconciliation, consumed on write;
/// never shared across files.
#[derive(Debug, Clone, PartialEq)]
pub struct SmetFile {
    /// Path the file was read from
    pub path: PathBuf,

    /// Verbatim bytes before the `[HEADER]` marker line
    pub preamble: String,

    /// Parsed header fields in encounter order
    pub header: HeaderMap,

    /// Verbatim bytes from the `[DATA]` marker line to end of file
    pub tail: String,
}

impl SmetFile {
    /// Read and parse a SMET file from disk
    pub fn read(path: &Path) -> Result<Self> {
        parser::read(path)
    }

    /// Parse SMET text; `origin` is used for diagnostics and kept as the path
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        parser::parse(text, origin)
    }

    /// Render back to text with the canonical field order
    pub fn render(&self) -> String {
        render::render(
            &self.preamble,
            &self.header,
            constants::CANONICAL_FIELD_ORDER,
            &self.tail,
        )
    }

    /// Render back to text with an explicit field order
    pub fn render_with_order(&self, field_order: &[&str]) -> String {
        render::render(&self.preamble, &self.header, field_order, &self.tail)
    }

    /// The `station_name` field, if present and non-empty
    pub fn station_name(&self) -> Option<&str> {
        self.header
            .get(fields::STATION_NAME)
            .filter(|name| !name.is_empty())
    }

    /// The `station_id` field as text, if present and non-empty
    pub fn station_id(&self) -> Option<&str> {
        self.header
            .get(fields::STATION_ID)
            .filter(|id| !id.is_empty())
    }

    /// The `station_id` field parsed to an integer, if present and numeric
    pub fn station_id_numeric(&self) -> Option<i64> {
        self.station_id().and_then(|id| id.parse().ok())
    }
}
