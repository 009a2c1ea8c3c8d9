use geo::{Distance, Euclidean, Point};
use rstar::{Envelope, AABB};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// A routable junction or shape point within the network.
///
/// `id` is the internal (database) identity, `osm_id` the map-source
/// identity it was imported from. Immutable once loaded into a graph
/// snapshot; adjacency is held by the owning [`super::Graph`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub osm_id: i64,
    pub position: Point,
}

impl Node {
    pub const fn new(id: i64, osm_id: i64, position: Point) -> Self {
        Node {
            id,
            osm_id,
            position,
        }
    }
}

impl rstar::RTreeObject for Node {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl rstar::PointDistance for Node {
    fn distance_2(
        &self,
        point: &<Self::Envelope as Envelope>::Point,
    ) -> <<Self::Envelope as Envelope>::Point as rstar::Point>::Scalar {
        Euclidean.distance(self.position, *point).powi(2)
    }
}

/// Legal-travel limits recorded against an edge. A zero maximum means
/// the dimension is unrestricted.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restrictions {
    /// Meters.
    pub max_height: f64,
    /// Kilograms.
    pub max_weight: f64,
    pub truck_allowed: bool,
}

impl Restrictions {
    pub const fn unrestricted() -> Self {
        Restrictions {
            max_height: 0.0,
            max_weight: 0.0,
            truck_allowed: true,
        }
    }

    /// Whether the given vehicle may legally traverse an edge carrying
    /// these restrictions.
    pub fn permits(&self, profile: &VehicleProfile) -> bool {
        if profile.kind == VehicleKind::Truck && !self.truck_allowed {
            return false;
        }

        if self.max_height > 0.0 && profile.height > self.max_height {
            return false;
        }

        if self.max_weight > 0.0 && profile.weight > self.max_weight {
            return false;
        }

        true
    }
}

impl Default for Restrictions {
    fn default() -> Self {
        Restrictions::unrestricted()
    }
}

/// A directed, weighted connection between two nodes. Bidirectional
/// roads are represented as two edges with swapped endpoints and
/// identical attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub travel_time: f64,
    pub restrictions: Restrictions,
    pub road_class: RoadClass,
    pub osm_way_id: i64,
}

/// The driveable highway classes retained at import. Anything outside
/// this set (footpaths, waterways, service alleys) never enters the
/// network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RoadClass {
    Motorway,
    MotorwayLink,
    Trunk,
    TrunkLink,
    Primary,
    PrimaryLink,
    Secondary,
    SecondaryLink,
    Tertiary,
    TertiaryLink,
    Unclassified,
    Residential,
}

impl RoadClass {
    /// Default truck travel speed for the class, km/h. Applied when a
    /// way carries no posted limit.
    #[inline]
    pub const fn default_speed_kmh(&self) -> f64 {
        match self {
            RoadClass::Motorway => 80.0,
            RoadClass::Trunk => 70.0,
            RoadClass::Primary => 60.0,
            RoadClass::Secondary => 50.0,
            RoadClass::MotorwayLink => 50.0,
            RoadClass::Tertiary => 40.0,
            RoadClass::TrunkLink => 40.0,
            RoadClass::PrimaryLink => 40.0,
            RoadClass::Unclassified => 30.0,
            RoadClass::SecondaryLink => 30.0,
            RoadClass::TertiaryLink => 30.0,
            RoadClass::Residential => 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum VehicleKind {
    Truck,
    Car,
}

/// The vehicle a route is computed for. Dimensions of zero are treated
/// as unspecified and exempt from dimension checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleProfile {
    pub kind: VehicleKind,
    /// Meters.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
}

impl VehicleProfile {
    pub const fn truck() -> Self {
        VehicleProfile {
            kind: VehicleKind::Truck,
            height: 0.0,
            weight: 0.0,
        }
    }

    pub const fn car() -> Self {
        VehicleProfile {
            kind: VehicleKind::Car,
            height: 0.0,
            weight: 0.0,
        }
    }

    /// Resolves a request-supplied vehicle type. Empty or unrecognised
    /// values fall back to the truck profile, the fleet default.
    pub fn parse(vehicle_type: &str) -> Self {
        match vehicle_type.parse::<VehicleKind>() {
            Ok(VehicleKind::Car) => VehicleProfile::car(),
            _ => VehicleProfile::truck(),
        }
    }
}

impl Default for VehicleProfile {
    fn default() -> Self {
        VehicleProfile::truck()
    }
}
