//! In-memory representation of the routable road network and the
//! shortest-path engine that runs over it.
//!
//! A [`Graph`] is an immutable snapshot of a loaded region: once
//! published it is never mutated, only replaced wholesale (see the
//! `update` module). The [`Router`] computes least-cost legal paths
//! over the active snapshot for a given [`VehicleProfile`].

pub mod cost;
pub mod error;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod item;
pub mod router;
#[cfg(test)]
mod test;

pub use cost::TimeAndDistance;
pub use error::RoutingError;
pub use graph::{Graph, PathSummary};
pub use item::{Edge, Node, Restrictions, RoadClass, VehicleKind, VehicleProfile};
pub use router::{RouteCalculator, RouteSummary, Router};
