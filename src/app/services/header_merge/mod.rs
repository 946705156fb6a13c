//! Header merge planning and application
//!
//! A merge is computed as a list of `(field, value)` updates before any
//! header is touched, so callers can decide whether a write is needed at
//! all. Two planners exist:
//! - [`plan_geo_copy`] copies geolocation values verbatim from an
//!   authority header (all named fields or nothing)
//! - [`updates_from_record`] renders a typed [`StationRecord`] and its
//!   projected coordinates into canonical header values
//!
//! [`apply_updates`] mutates a [`HeaderMap`] and reports how many values
//! actually changed; zero changes means the file can be left alone.

use crate::app::models::StationRecord;
use crate::app::services::reproject::{format_altitude, format_geographic, format_projected};
use crate::app::services::smet_codec::HeaderMap;
use crate::constants::fields;

pub mod units;

#[cfg(test)]
pub mod tests;

pub use units::{MultiplierEdit, UnitsEditError, set_channel_multiplier};

/// Plan a verbatim copy of the given fields from an authority header
///
/// Values are taken as strings exactly as they appear in the authority
/// file. The copy is all-or-nothing: if any requested field is absent
/// from the authority header the plan fails and the missing field names
/// are returned instead.
pub fn plan_geo_copy(
    authority: &HeaderMap,
    field_names: &[&str],
) -> std::result::Result<Vec<(String, String)>, Vec<String>> {
    let mut updates = Vec::with_capacity(field_names.len());
    let mut missing = Vec::new();

    for &name in field_names {
        match authority.get(name) {
            Some(value) => updates.push((name.to_string(), value.to_string())),
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(updates)
    } else {
        Err(missing)
    }
}

/// Render an authoritative record into canonical header updates
///
/// Produces the full identity and geolocation block: numeric station id,
/// geographic coordinates at 8 decimals, projected coordinates at 6,
/// altitude at 1, and the target EPSG code.
pub fn updates_from_record(
    record: &StationRecord,
    easting: f64,
    northing: f64,
    target_epsg: u32,
) -> Vec<(String, String)> {
    vec![
        (fields::STATION_ID.to_string(), record.station_id.to_string()),
        (
            fields::LATITUDE.to_string(),
            format_geographic(record.latitude),
        ),
        (
            fields::LONGITUDE.to_string(),
            format_geographic(record.longitude),
        ),
        (
            fields::ALTITUDE.to_string(),
            format_altitude(record.altitude),
        ),
        (fields::EASTING.to_string(), format_projected(easting)),
        (fields::NORTHING.to_string(), format_projected(northing)),
        (fields::EPSG.to_string(), target_epsg.to_string()),
    ]
}

/// Apply planned updates to a header, returning how many values changed
///
/// Fields already holding the planned value are left untouched, so a
/// return of zero means the header is already reconciled.
pub fn apply_updates(header: &mut HeaderMap, updates: &[(String, String)]) -> usize {
    let mut changed = 0;

    for (field, value) in updates {
        if header.get(field) != Some(value.as_str()) {
            header.set(field.as_str(), value.as_str());
            changed += 1;
        }
    }

    changed
}
