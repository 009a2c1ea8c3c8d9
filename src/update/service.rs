use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use log::{info, warn};
use tokio::sync::Mutex;

use crate::graph::Graph;
use crate::store::SpatialStore;
use crate::update::error::UpdateError;
use crate::update::event::{CacheInvalidation, InvalidationReason, OsmUpdate, RestrictionUpdate};
use crate::update::producer::InvalidationProducer;

/// Applies map and restriction changes to the live graph without a
/// full reimport.
///
/// Each update builds a complete successor snapshot and publishes it
/// through the atomically-swapped reference: queries never observe a
/// half-applied update. Writers serialize on `apply_lock`; readers are
/// never blocked.
pub struct GraphUpdateService {
    graph: Arc<ArcSwap<Graph>>,
    store: Arc<SpatialStore>,
    producer: Option<InvalidationProducer>,
    apply_lock: Mutex<()>,
}

impl GraphUpdateService {
    pub fn new(
        graph: Arc<ArcSwap<Graph>>,
        store: Arc<SpatialStore>,
        producer: Option<InvalidationProducer>,
    ) -> GraphUpdateService {
        GraphUpdateService {
            graph,
            store,
            producer,
            apply_lock: Mutex::new(()),
        }
    }

    /// Re-loads the updated region from the store, overlays it onto the
    /// current snapshot, then expires the cache rows the region could
    /// have affected.
    pub async fn apply_osm_update(&self, update: OsmUpdate) -> Result<(), UpdateError> {
        let _apply = self.apply_lock.lock().await;

        info!(
            "applying map update ({} nodes, {} ways changed)",
            update.node_count, update.way_count
        );

        let fresh = self.store.load_graph_for_region(update.region).await?;
        let next = self.graph.load().merge_region(update.region, &fresh);
        info!("publishing snapshot: {next:?}");
        self.graph.store(Arc::new(next));

        let expired = self
            .store
            .expire_cached_routes_in_region(update.region)
            .await?;

        self.publish(CacheInvalidation {
            reason: InvalidationReason::OsmUpdate,
            region: Some(update.region),
            edge_ids: Vec::new(),
            expired_routes: expired,
            occurred_at: Utc::now(),
        })
        .await;

        Ok(())
    }

    /// Rewrites legal-travel attributes on the named edge set. The
    /// cache schema does not record which edges a route traversed, so
    /// persisted routes expire conservatively.
    pub async fn apply_restriction_update(
        &self,
        update: RestrictionUpdate,
    ) -> Result<(), UpdateError> {
        let _apply = self.apply_lock.lock().await;

        info!(
            "applying restriction update to {} edges",
            update.edge_ids.len()
        );

        let next = self
            .graph
            .load()
            .with_restrictions(&update.edge_ids, update.restrictions);
        self.graph.store(Arc::new(next));

        let expired = self.store.expire_all_cached_routes().await?;

        self.publish(CacheInvalidation {
            reason: InvalidationReason::RestrictionUpdate,
            region: None,
            edge_ids: update.edge_ids,
            expired_routes: expired,
            occurred_at: Utc::now(),
        })
        .await;

        Ok(())
    }

    async fn publish(&self, event: CacheInvalidation) {
        let Some(producer) = &self.producer else {
            return;
        };

        if let Err(e) = producer.publish(&event).await {
            warn!("cache-invalidation publish failed: {e}");
        }
    }
}
