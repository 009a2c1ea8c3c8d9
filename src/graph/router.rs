use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use log::{debug, warn};

use crate::geo::meters_to_miles;
use crate::graph::error::RoutingError;
use crate::graph::graph::Graph;
use crate::graph::item::VehicleProfile;
use crate::store::{SpatialStore, StoreError};

/// What a route computation yields, in the units the fleet operates in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_miles: f64,
    pub time_minutes: f64,
}

/// The seam the batch service computes through. Production traffic goes
/// to [`Router`]; tests substitute instrumented calculators.
#[async_trait]
pub trait RouteCalculator: Send + Sync {
    async fn calculate_route(
        &self,
        origin_zip: &str,
        dest_zip: &str,
        profile: VehicleProfile,
    ) -> Result<RouteSummary, RoutingError>;
}

/// The routing engine: resolves postal codes against the spatial store,
/// consults the persisted route cache, and otherwise searches the
/// active graph snapshot.
pub struct Router {
    store: Arc<SpatialStore>,
    graph: Arc<ArcSwap<Graph>>,
}

impl Router {
    pub fn new(store: Arc<SpatialStore>, graph: Arc<ArcSwap<Graph>>) -> Self {
        Router { store, graph }
    }

    /// The active graph snapshot. Callers see a complete, consistent
    /// network even while an update is being applied.
    pub fn snapshot(&self) -> Arc<Graph> {
        self.graph.load_full()
    }

    async fn node_for_zip(&self, zip: &str) -> Result<i64, RoutingError> {
        match self.store.node_id_for_zip(zip).await {
            Ok(id) => Ok(id),
            Err(StoreError::NotFound) => Err(RoutingError::UnknownZip(zip.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RouteCalculator for Router {
    async fn calculate_route(
        &self,
        origin_zip: &str,
        dest_zip: &str,
        profile: VehicleProfile,
    ) -> Result<RouteSummary, RoutingError> {
        match self.store.cached_route(origin_zip, dest_zip).await {
            Ok(hit) => {
                debug!("route cache hit for {origin_zip}->{dest_zip}");
                return Ok(RouteSummary {
                    distance_miles: hit.distance,
                    time_minutes: hit.travel_time,
                });
            }
            Err(StoreError::NotFound) => {}
            // A degraded cache never blocks a computation.
            Err(e) => warn!("route cache lookup failed: {e}"),
        }

        let origin = self.node_for_zip(origin_zip).await?;
        let destination = self.node_for_zip(dest_zip).await?;

        let snapshot = self.snapshot();
        let path = snapshot.shortest_path(origin, destination, &profile)?;

        let summary = RouteSummary {
            distance_miles: meters_to_miles(path.distance),
            time_minutes: path.travel_time / 60.0,
        };

        debug!(
            "route {origin_zip}->{dest_zip}: {:.1}mi / {:.0}min over {} nodes",
            summary.distance_miles,
            summary.time_minutes,
            path.nodes.len()
        );

        if let Err(e) = self
            .store
            .save_cached_route(
                origin_zip,
                dest_zip,
                summary.distance_miles,
                summary.time_minutes,
            )
            .await
        {
            warn!("failed to refresh route cache for {origin_zip}->{dest_zip}: {e}");
        }

        Ok(summary)
    }
}
