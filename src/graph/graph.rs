use std::fmt::{Debug, Formatter};

use geo::Point;
use pathfinding::prelude::dijkstra;
use rstar::RTree;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::geo::Bounds;
use crate::graph::cost::TimeAndDistance;
use crate::graph::error::RoutingError;
use crate::graph::item::{Edge, Node, Restrictions, VehicleProfile};

/// An immutable snapshot of the road network for a loaded region.
///
/// Owns every node and edge; adjacency is derived from the per-node
/// outgoing-edge lists. A region graph is directionally partial at its
/// boundary: an edge whose origin lies inside the region may point at a
/// node that was never loaded.
pub struct Graph {
    nodes: FxHashMap<i64, Node>,
    edges: Vec<Edge>,
    outgoing: FxHashMap<i64, Vec<usize>>,
    index: RTree<Node>,
}

/// The outcome of a successful shortest-path search.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSummary {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub travel_time: f64,
    /// Node identities along the path, origin first.
    pub nodes: Vec<i64>,
}

impl Debug for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph with {} nodes, {} edges",
            self.nodes.len(),
            self.edges.len()
        )
    }
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let index = RTree::bulk_load(nodes.clone());

        let mut outgoing: FxHashMap<i64, Vec<usize>> = FxHashMap::default();
        for (ix, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.from).or_default().push(ix);
        }

        let nodes = nodes.into_iter().map(|node| (node.id, node)).collect();

        Graph {
            nodes,
            edges,
            outgoing,
            index,
        }
    }

    pub fn empty() -> Self {
        Graph::new(Vec::new(), Vec::new())
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: i64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[inline]
    pub fn contains_node(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn outgoing_edges(&self, node: i64) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(&node)
            .into_iter()
            .flatten()
            .map(|ix| &self.edges[*ix])
    }

    /// Finds the node nearest to a `(lng, lat)` position.
    pub fn nearest_node(&self, point: Point) -> Option<&Node> {
        self.index.nearest_neighbor(&point)
    }

    /// All loaded nodes whose position lies within `bounds`.
    pub fn nodes_within(&self, bounds: &Bounds) -> impl Iterator<Item = &Node> {
        self.index.locate_in_envelope(&bounds.envelope())
    }

    /// Least-cost legal path between two nodes. Cost is travel time,
    /// tie-broken by distance; edges the profile may not traverse are
    /// excluded from expansion.
    pub fn shortest_path(
        &self,
        origin: i64,
        destination: i64,
        profile: &VehicleProfile,
    ) -> Result<PathSummary, RoutingError> {
        if !self.contains_node(origin) {
            return Err(RoutingError::NodeNotFound(origin));
        }

        if !self.contains_node(destination) {
            return Err(RoutingError::NodeNotFound(destination));
        }

        let (path, cost) = dijkstra(
            &origin,
            |node| {
                self.outgoing_edges(*node)
                    .filter(|edge| edge.restrictions.permits(profile))
                    .map(|edge| (edge.to, TimeAndDistance::from_edge(edge)))
                    .collect::<Vec<_>>()
            },
            |node| *node == destination,
        )
        .ok_or(RoutingError::NoLegalRoute)?;

        Ok(PathSummary {
            distance: cost.meters(),
            travel_time: cost.seconds(),
            nodes: path,
        })
    }

    /// Overlays a freshly loaded region onto this snapshot, producing
    /// the next one. Nodes and origin-edges inside `bounds` are taken
    /// from `fresh`; everything outside is carried over unchanged.
    pub fn merge_region(&self, bounds: Bounds, fresh: &Graph) -> Graph {
        let mut nodes: Vec<Node> = fresh.nodes().copied().collect();
        let fresh_ids: FxHashSet<i64> = nodes.iter().map(|node| node.id).collect();

        nodes.extend(
            self.nodes
                .values()
                .filter(|node| !bounds.contains(node.position) && !fresh_ids.contains(&node.id))
                .copied(),
        );

        let mut edges: Vec<Edge> = fresh.edges.clone();
        edges.extend(
            self.edges
                .iter()
                .filter(|edge| {
                    self.nodes
                        .get(&edge.from)
                        .is_some_and(|node| !bounds.contains(node.position))
                })
                .cloned(),
        );

        Graph::new(nodes, edges)
    }

    /// Produces the next snapshot with `restrictions` rewritten on the
    /// named edge set.
    pub fn with_restrictions(&self, edge_ids: &[i64], restrictions: Restrictions) -> Graph {
        let targets: FxHashSet<i64> = edge_ids.iter().copied().collect();

        let edges = self
            .edges
            .iter()
            .cloned()
            .map(|mut edge| {
                if targets.contains(&edge.id) {
                    edge.restrictions = restrictions;
                }
                edge
            })
            .collect();

        Graph::new(self.nodes.values().copied().collect(), edges)
    }
}
