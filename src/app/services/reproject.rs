//! Coordinate reprojection for header geolocation fields
//!
//! Reconciled headers carry both geographic coordinates (EPSG:4326) and
//! projected grid coordinates (EPSG:3035, the European equal-area grid).
//! The projected pair is always derived from the authoritative geographic
//! pair, never trusted from the source file.
//!
//! The Lambert azimuthal equal-area forward mapping follows the EPSG
//! Guidance Note 7-2 ellipsoidal formulas on GRS80.

use crate::constants::geo;
use crate::{Error, Result};

// ============================================================================
// ETRS89-LAEA projection parameters (EPSG:3035)
// ============================================================================

/// GRS80 semi-major axis in meters
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// GRS80 inverse flattening
const INVERSE_FLATTENING: f64 = 298.257_222_101;

/// Latitude of natural origin in degrees
const ORIGIN_LATITUDE: f64 = 52.0;

/// Longitude of natural origin in degrees
const ORIGIN_LONGITUDE: f64 = 10.0;

/// False easting in meters
const FALSE_EASTING: f64 = 4_321_000.0;

/// False northing in meters
const FALSE_NORTHING: f64 = 3_210_000.0;

/// Forward projection from geographic to grid coordinates
///
/// Implementations take coordinates in degrees, x/y order (longitude
/// first), and return meters on the target grid.
pub trait Project {
    /// Project a geographic coordinate pair to (easting, northing)
    fn project(&self, longitude: f64, latitude: f64) -> Result<(f64, f64)>;

    /// EPSG code of the geographic source system
    fn source_epsg(&self) -> u32;

    /// EPSG code of the projected target system
    fn target_epsg(&self) -> u32;
}

/// ETRS89-LAEA (EPSG:4326 -> EPSG:3035) forward projection
///
/// Ellipsoid-dependent terms are precomputed at construction; projecting
/// a point is then a handful of trigonometric calls.
#[derive(Debug, Clone)]
pub struct EtrsLaea {
    e: f64,
    e2: f64,
    qp: f64,
    rq: f64,
    d: f64,
    sin_beta0: f64,
    cos_beta0: f64,
    lon0: f64,
}

impl EtrsLaea {
    pub fn new() -> Self {
        let f = 1.0 / INVERSE_FLATTENING;
        let e2 = f * (2.0 - f);
        let e = e2.sqrt();

        let lat0 = ORIGIN_LATITUDE.to_radians();
        let qp = authalic_q(e, e2, 1.0);
        let q0 = authalic_q(e, e2, lat0.sin());
        let beta0 = (q0 / qp).asin();
        let rq = SEMI_MAJOR_AXIS * (qp / 2.0).sqrt();
        let d = SEMI_MAJOR_AXIS * (lat0.cos() / (1.0 - e2 * lat0.sin().powi(2)).sqrt())
            / (rq * beta0.cos());

        Self {
            e,
            e2,
            qp,
            rq,
            d,
            sin_beta0: beta0.sin(),
            cos_beta0: beta0.cos(),
            lon0: ORIGIN_LONGITUDE.to_radians(),
        }
    }

    /// Construct a projection for an explicit EPSG pair
    ///
    /// Only the built-in 4326 -> 3035 mapping is available; any other pair
    /// is rejected rather than silently mis-projected.
    pub fn for_pair(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if source_epsg != geo::DEFAULT_SOURCE_EPSG || target_epsg != geo::DEFAULT_TARGET_EPSG {
            return Err(Error::projection(format!(
                "unsupported projection EPSG:{source_epsg} -> EPSG:{target_epsg} (only EPSG:{} -> EPSG:{} is built in)",
                geo::DEFAULT_SOURCE_EPSG,
                geo::DEFAULT_TARGET_EPSG
            )));
        }
        Ok(Self::new())
    }
}

impl Default for EtrsLaea {
    fn default() -> Self {
        Self::new()
    }
}

impl Project for EtrsLaea {
    fn project(&self, longitude: f64, latitude: f64) -> Result<(f64, f64)> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(Error::projection(format!(
                "non-finite coordinate ({longitude}, {latitude})"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::projection(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::projection(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }

        let lat = latitude.to_radians();
        let lon = longitude.to_radians();

        let q = authalic_q(self.e, self.e2, lat.sin());
        // Clamp against rounding drift at the poles
        let beta = (q / self.qp).clamp(-1.0, 1.0).asin();
        let delta_lon = lon - self.lon0;

        let denominator =
            1.0 + self.sin_beta0 * beta.sin() + self.cos_beta0 * beta.cos() * delta_lon.cos();
        if denominator <= f64::EPSILON {
            return Err(Error::projection(format!(
                "coordinate ({longitude}, {latitude}) is antipodal to the projection origin"
            )));
        }

        let b = self.rq * (2.0 / denominator).sqrt();
        let easting = FALSE_EASTING + b * self.d * beta.cos() * delta_lon.sin();
        let northing = FALSE_NORTHING
            + (b / self.d)
                * (self.cos_beta0 * beta.sin() - self.sin_beta0 * beta.cos() * delta_lon.cos());

        Ok((easting, northing))
    }

    fn source_epsg(&self) -> u32 {
        geo::DEFAULT_SOURCE_EPSG
    }

    fn target_epsg(&self) -> u32 {
        geo::DEFAULT_TARGET_EPSG
    }
}

/// Authalic latitude helper `q` from the EPSG LAEA formulas
fn authalic_q(e: f64, e2: f64, sin_lat: f64) -> f64 {
    (1.0 - e2)
        * (sin_lat / (1.0 - e2 * sin_lat * sin_lat)
            - (1.0 / (2.0 * e)) * ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).ln())
}

// ============================================================================
// Canonical value formatting
// ============================================================================

/// Format a geographic coordinate at canonical precision
pub fn format_geographic(value: f64) -> String {
    format!("{:.*}", geo::GEOGRAPHIC_DECIMALS, value)
}

/// Format a projected coordinate at canonical precision
pub fn format_projected(value: f64) -> String {
    format!("{:.*}", geo::PROJECTED_DECIMALS, value)
}

/// Format an altitude at canonical precision
pub fn format_altitude(value: f64) -> String {
    format!("{:.*}", geo::ALTITUDE_DECIMALS, value)
}
