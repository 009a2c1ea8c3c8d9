use std::str::FromStr;

use geo::{Destination, Geodesic, Point};
use rstar::AABB;
use serde::{Deserialize, Serialize};

/// A geographic bounding box, constructed per request to scope region
/// loads and visualizations. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Builds bounds from two corners, normalizing so that min <= max
    /// on both axes.
    pub fn new(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Self {
        Bounds {
            min_lat: lat1.min(lat2),
            min_lon: lon1.min(lon2),
            max_lat: lat1.max(lat2),
            max_lon: lon1.max(lon2),
        }
    }

    /// A square region of `radius` meters around a center point.
    pub fn around(center: Point, radius: f64) -> Self {
        let bottom_right = Geodesic.destination(center, 135.0, radius);
        let top_left = Geodesic.destination(center, 315.0, radius);

        Bounds::new(
            top_left.y(),
            top_left.x(),
            bottom_right.y(),
            bottom_right.x(),
        )
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        let (lon, lat) = point.x_y();
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// The envelope usable for r-tree scans over `(lng, lat)` points.
    #[inline]
    pub fn envelope(&self) -> AABB<Point> {
        AABB::from_corners(
            Point::new(self.min_lon, self.min_lat),
            Point::new(self.max_lon, self.max_lat),
        )
    }
}

/// Parses the operator-facing `"lat1,lon1,lat2,lon2"` form.
impl FromStr for Bounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("region must be four comma-separated numbers: {e}"))?;

        match parts.as_slice() {
            [lat1, lon1, lat2, lon2] => {
                if !(-90.0..=90.0).contains(lat1) || !(-90.0..=90.0).contains(lat2) {
                    return Err(format!("latitude out of range in region {s:?}"));
                }

                if !(-180.0..=180.0).contains(lon1) || !(-180.0..=180.0).contains(lon2) {
                    return Err(format!("longitude out of range in region {s:?}"));
                }

                Ok(Bounds::new(*lat1, *lon1, *lat2, *lon2))
            }
            _ => Err(format!(
                "region {s:?} must be \"lat1,lon1,lat2,lon2\", got {} values",
                parts.len()
            )),
        }
    }
}
