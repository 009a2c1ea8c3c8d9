use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Bounds;
use crate::graph::Restrictions;

/// New or changed nodes and ways for a region, announced by the map
/// pipeline. Consumed once; never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsmUpdate {
    pub region: Bounds,
    #[serde(default)]
    pub node_count: u64,
    #[serde(default)]
    pub way_count: u64,
}

/// Changed legal-travel attributes for a named edge set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionUpdate {
    pub edge_ids: Vec<i64>,
    pub restrictions: Restrictions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    OsmUpdate,
    RestrictionUpdate,
}

/// Published after an update lands, so downstream caches can drop
/// routes the change may have affected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheInvalidation {
    pub reason: InvalidationReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edge_ids: Vec<i64>,
    pub expired_routes: u64,
    pub occurred_at: DateTime<Utc>,
}
