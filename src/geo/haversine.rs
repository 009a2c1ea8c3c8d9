//! Great-circle distance between two geographic points.

use geo::Point;

use crate::geo::MEAN_EARTH_RADIUS;

/// Returns the great-circle distance, in meters, between two points
/// expressed as `geo::Point` values where `x` is longitude and `y` is
/// latitude (both in degrees).
#[inline]
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lon = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    MEAN_EARTH_RADIUS * 2.0 * h.sqrt().asin()
}
