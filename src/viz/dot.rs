use std::fmt::Write;

use crate::graph::{Edge, Node};

/// Degrees spread thinly; scale positions up so the layout engine
/// keeps junctions distinguishable.
const POSITION_SCALE: f64 = 100.0;

/// Emits the intermediate graph-description (DOT) document consumed by
/// the external layout binary. Node positions are pinned so the layout
/// mirrors geography; truck-restricted edges render red.
pub fn graph_description(nodes: &[Node], edges: &[Edge]) -> String {
    let mut out = String::from("digraph road_network {\n");
    out.push_str("  node [shape=point, width=0.05];\n");

    for node in nodes {
        let _ = writeln!(
            out,
            "  n{} [pos=\"{:.4},{:.4}!\"];",
            node.id,
            node.position.x() * POSITION_SCALE,
            node.position.y() * POSITION_SCALE,
        );
    }

    for edge in edges {
        let color = if edge.restrictions.truck_allowed {
            "gray40"
        } else {
            "red"
        };

        let _ = writeln!(
            out,
            "  n{} -> n{} [color={color}, penwidth=0.3, arrowsize=0.2];",
            edge.from, edge.to,
        );
    }

    out.push_str("}\n");
    out
}
