//! Geographic helpers and the location capability seam.

use async_trait::async_trait;
use santemap_schema::{Coordinate, Facility};
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Facilities ordered by distance from `origin`, nearest first, capped at
/// `limit`. Ties keep catalog order (stable sort).
pub fn nearest<'a>(facilities: &'a [Facility], origin: Coordinate, limit: usize) -> Vec<&'a Facility> {
    let mut ranked: Vec<&Facility> = facilities.iter().collect();
    ranked.sort_by(|a, b| {
        let da = distance_km(origin, a.position);
        let db = distance_km(origin, b.position);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    Denied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
    #[error("location request timed out")]
    Timeout,
}

/// One-shot location capability. The real sensor lives outside this
/// crate; callers inject whatever implementation their platform has.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_location(&self) -> Result<Coordinate, LocationError>;
}

/// Always answers with a fixed coordinate. Useful for tests and for
/// deployments that pin the map to a known city center.
pub struct FixedLocationProvider(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn request_location(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}
