//! Shared fixtures for header merge tests

use crate::app::services::smet_codec::HeaderMap;


/// Build a header with a full geolocation block
pub fn create_geo_header() -> HeaderMap {
    HeaderMap::from_iter([
        ("station_id", "42"),
        ("station_name", "Passo Rolle"),
        ("latitude", "46.29753000"),
        ("longitude", "11.78817000"),
        ("altitude", "2004.0"),
        ("easting", "4446934.000000"),
        ("northing", "2578008.000000"),
        ("epsg", "3035"),
    ])
}
