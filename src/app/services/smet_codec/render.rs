//! Canonical SMET header rendering
//!
//! Serializes a header map back to text: preamble verbatim, `[HEADER]`,
//! fields in the requested order (only those present), remaining fields in
//! encounter order, then the opaque tail verbatim.

use crate::constants::{HEADER_MARKER, KEY_COLUMN_WIDTH};

use super::HeaderMap;

/// Render a SMET document from its parts
///
/// Field keys are left-padded to [`KEY_COLUMN_WIDTH`] (never truncated) to
/// keep historical files visually aligned. The tail is reproduced
/// byte-identical; a single final line terminator is appended only when the
/// input lacked one.
pub fn render(preamble: &str, header: &HeaderMap, field_order: &[&str], tail: &str) -> String {
    let mut out =
        String::with_capacity(preamble.len() + tail.len() + (KEY_COLUMN_WIDTH + 16) * header.len());

    out.push_str(preamble);
    out.push_str(HEADER_MARKER);
    out.push('\n');

    for key in field_order {
        if let Some(value) = header.get(key) {
            push_field_line(&mut out, key, value);
        }
    }
    for (key, value) in header.iter() {
        if !field_order.contains(&key) {
            push_field_line(&mut out, key, value);
        }
    }

    out.push_str(tail);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn push_field_line(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!(
        "{:<width$}= {}\n",
        key,
        value,
        width = KEY_COLUMN_WIDTH
    ));
}
