use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};

use geo::Point;
use itertools::Itertools;
use log::{info, warn};
use osmpbf::{Element, ElementReader};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use tokio::sync::mpsc;

use crate::geo::haversine_distance;
use crate::import::error::ImportError;
use crate::import::progress::{ImportCounters, ProgressReporter};
use crate::import::source::Extract;
use crate::import::speed::{SpeedModel, TruckSpeeds};
use crate::import::tags::WayInfo;
use crate::store::{EdgeRecord, NodeRecord, SpatialStore, StoreError};

/// Rows per batched insert, for nodes and edges alike.
pub const BATCH_SIZE: usize = 10_000;

/// Pre-sizing for the road-node set; continental extracts reference
/// tens of millions of road nodes.
const ROAD_NODE_CAPACITY: usize = 10_000_000;

/// In-flight batches between the scanning task and the insert loop.
const PIPELINE_DEPTH: usize = 4;

enum Batch {
    Nodes(Vec<NodeRecord>),
    Edges(Vec<EdgeRecord>),
}

/// What an import run produced, from the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub nodes: u64,
    pub skipped_nodes: u64,
    pub ways: u64,
    pub edges: u64,
    pub dropped_edges: u64,
}

/// The two-pass extract importer.
///
/// The road-node set and the coordinate cache sit behind read/write
/// locks so future concurrent readers stay safe; the importer itself
/// writes from a single scanning task per pass.
pub struct Importer {
    store: Arc<SpatialStore>,
    speeds: Arc<dyn SpeedModel>,
    counters: Arc<ImportCounters>,
    road_nodes: RwLock<FxHashSet<i64>>,
    coordinates: RwLock<FxHashMap<i64, (f64, f64)>>,
}

impl Importer {
    pub fn new(store: Arc<SpatialStore>) -> Importer {
        Importer::with_speed_model(store, Arc::new(TruckSpeeds))
    }

    pub fn with_speed_model(store: Arc<SpatialStore>, speeds: Arc<dyn SpeedModel>) -> Importer {
        Importer {
            store,
            speeds,
            counters: Arc::new(ImportCounters::new()),
            road_nodes: RwLock::new(FxHashSet::default()),
            coordinates: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn counters(&self) -> Arc<ImportCounters> {
        Arc::clone(&self.counters)
    }

    /// Runs both passes to completion. Batch-level insert failures are
    /// logged and skipped; only infrastructure failures (an exhausted
    /// pool, an unreadable source) abort the import.
    pub async fn run(self: Arc<Self>, extract: &Extract) -> Result<ImportSummary, ImportError> {
        info!("starting import of {:?}", extract.path());
        let reporter = ProgressReporter::spawn(self.counters());

        // Pass 1: which nodes participate in a driveable way.
        let reader = extract.reader()?;
        let this = Arc::clone(&self);
        tokio::task::spawn_blocking(move || this.collect_road_nodes(reader))
            .await
            .expect("road-node scan panicked")?;

        let road_nodes = self.road_nodes.read().expect("road-node lock poisoned").len();
        info!("pass 1 complete: {road_nodes} distinct road nodes");

        // Pass 2: re-scan from the start, materializing nodes and edges.
        let reader = extract.reader()?;
        let (tx, mut rx) = mpsc::channel::<Batch>(PIPELINE_DEPTH);
        let this = Arc::clone(&self);
        let scan = tokio::task::spawn_blocking(move || this.scan_and_enqueue(reader, tx));

        while let Some(batch) = rx.recv().await {
            if let Err(e) = self.apply_batch(batch).await {
                drop(rx);
                let _ = scan.await;
                reporter.finish();
                return Err(e);
            }
        }

        scan.await.expect("materializing scan panicked")?;
        reporter.finish();

        let summary = self.summary();
        info!(
            "import complete in {:.1}s: {} nodes ({} skipped), {} ways, {} edges ({} dropped)",
            self.counters.elapsed().as_secs_f64(),
            summary.nodes,
            summary.skipped_nodes,
            summary.ways,
            summary.edges,
            summary.dropped_edges,
        );

        Ok(summary)
    }

    fn summary(&self) -> ImportSummary {
        ImportSummary {
            nodes: self.counters.nodes.load(Ordering::Relaxed),
            skipped_nodes: self.counters.skipped_nodes.load(Ordering::Relaxed),
            ways: self.counters.ways.load(Ordering::Relaxed),
            edges: self.counters.edges.load(Ordering::Relaxed),
            dropped_edges: self.counters.dropped_edges.load(Ordering::Relaxed),
        }
    }

    fn collect_road_nodes(
        &self,
        reader: ElementReader<BufReader<File>>,
    ) -> Result<(), ImportError> {
        let mut set = FxHashSet::with_capacity_and_hasher(ROAD_NODE_CAPACITY, FxBuildHasher);

        reader.for_each(|element| {
            if let Element::Way(way) = element {
                if WayInfo::from_way(&way).is_some() {
                    set.extend(way.refs());
                }
            }
        })?;

        *self.road_nodes.write().expect("road-node lock poisoned") = set;
        Ok(())
    }

    fn scan_and_enqueue(
        &self,
        reader: ElementReader<BufReader<File>>,
        tx: mpsc::Sender<Batch>,
    ) -> Result<(), ImportError> {
        let road_nodes = self.road_nodes.read().expect("road-node lock poisoned");

        let mut nodes: Vec<NodeRecord> = Vec::with_capacity(BATCH_SIZE);
        let mut edges: Vec<EdgeRecord> = Vec::with_capacity(BATCH_SIZE);
        let mut nodes_flushed = false;
        let mut closed = false;

        reader.for_each(|element| match element {
            Element::Node(node) => self.take_node(
                node.id(),
                node.lon(),
                node.lat(),
                &road_nodes,
                &mut nodes,
                &tx,
                &mut closed,
            ),
            Element::DenseNode(node) => self.take_node(
                node.id(),
                node.lon(),
                node.lat(),
                &road_nodes,
                &mut nodes,
                &tx,
                &mut closed,
            ),
            Element::Way(way) => {
                // Edge resolution joins against the node rows, so the
                // trailing node batch must land first.
                if !nodes_flushed {
                    nodes_flushed = true;
                    if !nodes.is_empty() {
                        send(&tx, Batch::Nodes(std::mem::take(&mut nodes)), &mut closed);
                    }
                }

                self.take_way(&way, &mut edges, &tx, &mut closed);
            }
            Element::Relation(_) => {}
        })?;

        if !nodes.is_empty() {
            send(&tx, Batch::Nodes(nodes), &mut closed);
        }

        if !edges.is_empty() {
            send(&tx, Batch::Edges(edges), &mut closed);
        }

        if closed {
            return Err(ImportError::PipelineClosed);
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn take_node(
        &self,
        id: i64,
        lon: f64,
        lat: f64,
        road_nodes: &FxHashSet<i64>,
        batch: &mut Vec<NodeRecord>,
        tx: &mpsc::Sender<Batch>,
        closed: &mut bool,
    ) {
        if !road_nodes.contains(&id) {
            self.counters.skipped_nodes.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.coordinates
            .write()
            .expect("coordinate lock poisoned")
            .insert(id, (lon, lat));

        batch.push(NodeRecord { osm_id: id, lon, lat });
        self.counters.nodes.fetch_add(1, Ordering::Relaxed);

        if batch.len() >= BATCH_SIZE {
            send(tx, Batch::Nodes(std::mem::take(batch)), closed);
        }
    }

    fn take_way(
        &self,
        way: &osmpbf::Way,
        batch: &mut Vec<EdgeRecord>,
        tx: &mpsc::Sender<Batch>,
        closed: &mut bool,
    ) {
        let Some(info) = WayInfo::from_way(way) else {
            return;
        };

        let refs: Vec<i64> = way.refs().collect();
        let coordinates = self.coordinates.read().expect("coordinate lock poisoned");
        build_edge_records(way.id(), &info, &refs, &coordinates, &*self.speeds, batch);

        self.counters.ways.fetch_add(1, Ordering::Relaxed);

        while batch.len() >= BATCH_SIZE {
            let chunk: Vec<EdgeRecord> = batch.drain(..BATCH_SIZE).collect();
            send(tx, Batch::Edges(chunk), closed);
        }
    }

    async fn apply_batch(&self, batch: Batch) -> Result<(), ImportError> {
        match batch {
            Batch::Nodes(records) => {
                if let Err(e) = self.store.insert_node_batch(&records).await {
                    if is_fatal(&e) {
                        return Err(e.into());
                    }
                    warn!("node batch of {} failed, skipping: {e}", records.len());
                }
            }
            Batch::Edges(records) => match self.store.insert_edge_batch(&records).await {
                Ok(inserted) => {
                    self.counters.edges.fetch_add(inserted, Ordering::Relaxed);

                    let dropped = (records.len() as u64).saturating_sub(inserted);
                    if dropped > 0 {
                        self.counters.dropped_edges.fetch_add(dropped, Ordering::Relaxed);
                        warn!("{dropped} edges referenced unresolved nodes, dropped");
                    }
                }
                Err(e) => {
                    if is_fatal(&e) {
                        return Err(e.into());
                    }
                    warn!("edge batch of {} failed, skipping: {e}", records.len());
                }
            },
        }

        Ok(())
    }
}

/// Materializes edge records for every consecutive node pair of a
/// driveable way whose endpoints both have cached coordinates. Two-way
/// ways also yield the reverse twin with swapped endpoints.
pub(crate) fn build_edge_records(
    way_id: i64,
    info: &WayInfo,
    refs: &[i64],
    coordinates: &FxHashMap<i64, (f64, f64)>,
    speeds: &dyn SpeedModel,
    out: &mut Vec<EdgeRecord>,
) {
    for (from, to) in refs.iter().tuple_windows() {
        let (Some(&(from_lon, from_lat)), Some(&(to_lon, to_lat))) =
            (coordinates.get(from), coordinates.get(to))
        else {
            continue;
        };

        let distance = haversine_distance(
            Point::new(from_lon, from_lat),
            Point::new(to_lon, to_lat),
        );
        let travel_time = speeds.travel_time(distance, info.class, info.posted_speed_kmh);

        let forward = EdgeRecord {
            from_osm_id: *from,
            to_osm_id: *to,
            distance,
            travel_time,
            max_height: info.restrictions.max_height,
            max_weight: info.restrictions.max_weight,
            truck_allowed: info.restrictions.truck_allowed,
            road_type: info.class.as_ref().to_string(),
            osm_way_id: way_id,
        };

        if !info.one_way {
            let mut reverse = forward.clone();
            reverse.from_osm_id = *to;
            reverse.to_osm_id = *from;
            out.push(forward);
            out.push(reverse);
        } else {
            out.push(forward);
        }
    }
}

fn send(tx: &mpsc::Sender<Batch>, batch: Batch, closed: &mut bool) {
    if *closed {
        return;
    }

    if tx.blocking_send(batch).is_err() {
        *closed = true;
    }
}

fn is_fatal(err: &StoreError) -> bool {
    matches!(
        err,
        StoreError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)
    )
}
