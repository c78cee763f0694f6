use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// A point on the Earth's surface, expressed in decimal degrees.
///
/// `Coordinate::new` is the only constructor, so the lat/lng range invariant
/// is enforced once instead of re-checked at every planner/aggregator call
/// site.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ParseCoordinateError {
    #[error("latitude/longitude must be finite")]
    NotFinite,
    #[error("latitude out of range [-90, 90]")]
    LatitudeOutOfRange,
    #[error("longitude out of range [-180, 180]")]
    LongitudeOutOfRange,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ParseCoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(ParseCoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ParseCoordinateError::LatitudeOutOfRange);
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ParseCoordinateError::LongitudeOutOfRange);
        }
        Ok(Self { lat, lng })
    }

    /// Great-circle ("as the crow flies") distance to `coord`, in kilometers.
    pub fn distance_km(&self, coord: &Self) -> f64 {
        const R: f64 = 6371.0;
        let dist_lat = f64::to_radians(coord.lat - self.lat);
        let dist_lng = f64::to_radians(coord.lng - self.lng);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.lat))
                * f64::cos(f64::to_radians(coord.lat))
                * f64::sin(dist_lng / 2.0)
                * f64::sin(dist_lng / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        R * c
    }

    /// Initial compass bearing (degrees, `[0, 360)`) from this coordinate to `coord`.
    pub fn bearing_deg(&self, coord: &Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = coord.lat.to_radians();
        let dlng = (coord.lng - self.lng).to_radians();
        let y = dlng.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
        (y.atan2(x).to_degrees() + 360.0) % 360.0
    }

    /// Rounds to 4 decimal places (~11m), used for the fare-quote cache key.
    pub fn coarsened(&self) -> (i64, i64) {
        ((self.lat * 10_000.0).round() as i64, (self.lng * 10_000.0).round() as i64)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}
