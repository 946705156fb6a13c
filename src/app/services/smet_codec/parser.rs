//! Single-pass SMET text parsing
//!
//! Scans the raw file text once, tracking byte offsets of the `[HEADER]` and
//! `[DATA]` marker lines so the preamble and tail can be taken as exact byte
//! slices of the input. Within the header section, blank lines and `#`
//! comments are skipped and `key = value` lines are collected
//! whitespace-tolerantly; anything else is ignored.

use std::path::Path;

use crate::constants::{self, COMMENT_PREFIX, MIN_PREAMBLE_LINES};
use crate::{Error, Result};

use super::{HeaderMap, SmetFile};

/// Read a SMET file from disk and parse it
pub fn read(path: &Path) -> Result<SmetFile> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read '{}'", path.display()), e))?;
    parse(&text, path)
}

/// Parse SMET text into preamble, header fields, and opaque tail
///
/// Fails with [`Error::MalformedHeader`] when the `[DATA]` marker is absent,
/// when no `[HEADER]` marker precedes it, or when no preamble line (the
/// format banner) precedes `[HEADER]`. Callers treat these as per-file
/// skips, not fatal errors.
pub fn parse(text: &str, origin: &Path) -> Result<SmetFile> {
    let mut header = HeaderMap::new();
    let mut header_offset: Option<usize> = None;
    let mut data_offset: Option<usize> = None;
    let mut preamble_lines = 0usize;

    let mut offset = 0usize;
    for segment in text.split_inclusive('\n') {
        let line_start = offset;
        offset += segment.len();
        let line = segment.trim_end_matches('\n').trim_end_matches('\r');

        // The tail starts at the [DATA] marker line, inclusive
        if constants::is_data_marker(line) {
            data_offset = Some(line_start);
            break;
        }

        if header_offset.is_none() {
            if constants::is_header_marker(line) {
                header_offset = Some(line_start);
            } else {
                preamble_lines += 1;
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }
        if let Some((key, value)) = split_field_line(trimmed) {
            // Later duplicates overwrite the value, keeping the first position
            header.set(key, value);
        }
    }

    let data_offset = data_offset.ok_or_else(|| {
        Error::malformed_header(origin.display().to_string(), "no [DATA] marker found")
    })?;

    let header_offset = header_offset.ok_or_else(|| {
        Error::malformed_header(
            origin.display().to_string(),
            "no [HEADER] marker before [DATA]",
        )
    })?;

    if preamble_lines < MIN_PREAMBLE_LINES {
        return Err(Error::malformed_header(
            origin.display().to_string(),
            "missing format banner before [HEADER]",
        ));
    }

    Ok(SmetFile {
        path: origin.to_path_buf(),
        preamble: text[..header_offset].to_string(),
        header,
        tail: text[data_offset..].to_string(),
    })
}

/// Split a `key = value` line at the first `=`, trimming both sides
///
/// Returns `None` for lines without `=` or with a key that is not a plain
/// identifier; such lines are ignored by the tolerant parser.
fn split_field_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if !constants::is_valid_field_name(key) {
        return None;
    }
    Some((key, value.trim()))
}
