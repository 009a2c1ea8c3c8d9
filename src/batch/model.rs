use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single route to compute. An empty `vehicle_type` defaults to
/// `"truck"` at computation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub id: String,
    pub origin_zip: String,
    pub dest_zip: String,
    #[serde(default)]
    pub vehicle_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Success,
    Error,
}

/// The outcome of one route computation within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub id: String,
    pub origin_zip: String,
    pub dest_zip: String,
    pub vehicle_type: String,
    pub distance_miles: f64,
    pub time_minutes: f64,
    pub status: RouteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub calculated_at: DateTime<Utc>,
}

/// A failed route, keyed by its request identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteError {
    pub id: String,
    pub message: String,
}

/// A set of independent route requests, optionally delivered to a
/// callback URL once complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCalculationRequest {
    pub id: String,
    pub routes: Vec<RouteRequest>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Every route succeeded.
    Completed,
    /// Some, but not all, routes succeeded.
    Partial,
    /// No route succeeded.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_routes: usize,
    pub successful_routes: usize,
    pub failed_routes: usize,
    /// Wall-clock duration of the whole batch, milliseconds.
    pub total_time_ms: u64,
    /// `total_time_ms / total_routes`, zero when nothing succeeded.
    pub average_time_ms: u64,
}

impl BatchStats {
    pub fn aggregate(total: usize, successful: usize, total_time_ms: u64) -> BatchStats {
        let failed = total - successful;

        let average_time_ms = if successful > 0 && total > 0 {
            total_time_ms / total as u64
        } else {
            0
        };

        BatchStats {
            total_routes: total,
            successful_routes: successful,
            failed_routes: failed,
            total_time_ms,
            average_time_ms,
        }
    }

    pub fn status(&self) -> BatchStatus {
        if self.failed_routes == 0 {
            BatchStatus::Completed
        } else if self.successful_routes > 0 {
            BatchStatus::Partial
        } else {
            BatchStatus::Failed
        }
    }
}

/// The aggregate outcome of a batch. Always returned as a value;
/// failure is communicated through `status` and `errors`, never as a
/// call-level error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub id: String,
    pub completed_at: DateTime<Utc>,
    pub status: BatchStatus,
    pub results: Vec<RouteResult>,
    pub errors: Vec<RouteError>,
    pub stats: BatchStats,
}
