use chrono::{DateTime, Duration, Utc};

/// How long a cached route stays live after (re)computation.
pub const CACHE_EXPIRY_HOURS: i64 = 48;

/// A persisted route-cache row. At most one live row exists per
/// `(origin_zip, dest_zip)` pair; recomputation refreshes the row and
/// extends expiry by the fixed window.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRoute {
    pub origin_zip: String,
    pub dest_zip: String,
    /// Statute miles, as reported to callers.
    pub distance: f64,
    /// Minutes.
    pub travel_time: f64,
    pub calculated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedRoute {
    /// The expiry a row computed at `calculated_at` carries.
    pub fn expiry_for(calculated_at: DateTime<Utc>) -> DateTime<Utc> {
        calculated_at + Duration::hours(CACHE_EXPIRY_HOURS)
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A node pending batched insert during import, keyed by its
/// map-source identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub osm_id: i64,
    pub lon: f64,
    pub lat: f64,
}

/// An edge pending batched insert during import. Endpoints reference
/// map-source node identities; they resolve to internal identities via
/// a join at insert time, and unresolved references drop out of the
/// batch silently.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub from_osm_id: i64,
    pub to_osm_id: i64,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub travel_time: f64,
    pub max_height: f64,
    pub max_weight: f64,
    pub truck_allowed: bool,
    pub road_type: String,
    pub osm_way_id: i64,
}
