//! Tests for canonical header rendering

use std::path::Path;

use super::create_canonical_smet;
use crate::app::services::smet_codec::{HeaderMap, SmetFile, render};
use crate::constants::CANONICAL_FIELD_ORDER;

fn origin() -> &'static Path {
    Path::new("test.smet")
}

#[test]
fn test_round_trip_is_byte_identical() {
    let text = create_canonical_smet();
    let smet = SmetFile::parse(&text, origin()).unwrap();

    assert_eq!(smet.render(), text);
}

#[test]
fn test_repeated_round_trips_are_stable() {
    let text = create_canonical_smet();
    let first = SmetFile::parse(&text, origin()).unwrap().render();
    let second = SmetFile::parse(&first, origin()).unwrap().render();

    assert_eq!(first, second);
}

#[test]
fn test_renders_canonical_order_from_shuffled_header() {
    let header: HeaderMap = [
        ("tz", "1"),
        ("station_name", "COGNE"),
        ("latitude", "45.60809000"),
        ("station_id", "37"),
    ]
    .into_iter()
    .collect();

    let rendered = render("SMET 1.1 ASCII\n", &header, CANONICAL_FIELD_ORDER, "[DATA]\n0\n");
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "SMET 1.1 ASCII");
    assert_eq!(lines[1], "[HEADER]");
    assert_eq!(lines[2], "station_id       = 37");
    assert_eq!(lines[3], "station_name     = COGNE");
    assert_eq!(lines[4], "latitude         = 45.60809000");
    assert_eq!(lines[5], "tz               = 1");
    assert_eq!(lines[6], "[DATA]");
}

#[test]
fn test_unknown_fields_follow_canonical_ones_in_encounter_order() {
    let header: HeaderMap = [
        ("creation_date", "2023-04-01"),
        ("station_id", "9"),
        ("source", "ARPA"),
    ]
    .into_iter()
    .collect();

    let rendered = render("SMET 1.1 ASCII\n", &header, CANONICAL_FIELD_ORDER, "[DATA]\n0\n");
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[2], "station_id       = 9");
    assert_eq!(lines[3], "creation_date    = 2023-04-01");
    assert_eq!(lines[4], "source           = ARPA");
}

#[test]
fn test_appends_single_final_newline_when_missing() {
    let text = "SMET 1.1 ASCII\n[HEADER]\nstation_id = 1\n[DATA]\n0 0";
    let smet = SmetFile::parse(text, origin()).unwrap();
    let rendered = smet.render();

    assert!(rendered.ends_with("0 0\n"));
    assert!(!rendered.ends_with("0 0\n\n"));
}

#[test]
fn test_long_keys_are_not_truncated() {
    let header: HeaderMap = [("a_rather_long_nonstandard_key", "x")].into_iter().collect();

    let rendered = render("SMET 1.1 ASCII\n", &header, CANONICAL_FIELD_ORDER, "[DATA]\n0\n");

    assert!(rendered.contains("a_rather_long_nonstandard_key= x\n"));
}

#[test]
fn test_render_with_explicit_order() {
    let header: HeaderMap = [("b", "2"), ("a", "1")].into_iter().collect();
    let smet = SmetFile {
        path: origin().to_path_buf(),
        preamble: "SMET 1.1 ASCII\n".to_string(),
        header,
        tail: "[DATA]\n0\n".to_string(),
    };

    let rendered = smet.render_with_order(&["a", "b"]);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[2], "a                = 1");
    assert_eq!(lines[3], "b                = 2");
}
