use crate::graph::RoadClass;

/// Derives a travel speed for an edge. Implementations must be
/// deterministic: the derived travel time is monotonic in distance by
/// construction.
pub trait SpeedModel: Send + Sync {
    /// Travel speed in km/h for an edge of the given class, honoring a
    /// posted limit when one exists.
    fn speed_kmh(&self, class: RoadClass, posted_kmh: Option<f64>) -> f64;

    /// Travel time in seconds over `distance` meters.
    fn travel_time(&self, distance: f64, class: RoadClass, posted_kmh: Option<f64>) -> f64 {
        let kmh = self.speed_kmh(class, posted_kmh).max(1.0);
        distance / (kmh / 3.6)
    }
}

/// The default truck calibration: the posted limit when tagged, the
/// per-class table otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct TruckSpeeds;

impl SpeedModel for TruckSpeeds {
    fn speed_kmh(&self, class: RoadClass, posted_kmh: Option<f64>) -> f64 {
        posted_kmh
            .filter(|speed| *speed > 0.0)
            .unwrap_or_else(|| class.default_speed_kmh())
    }
}
