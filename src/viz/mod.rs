//! Operator-facing visualization of a network slice: emits a graph
//! description and shells out to an external layout binary. A
//! debugging aid, not a serving surface.

pub mod dot;
pub mod error;

use std::path::PathBuf;

use log::info;
use rustc_hash::FxHashSet;
use strum::{AsRefStr, Display, EnumString};
use tokio::process::Command;

use crate::geo::{Bounds, METERS_PER_MILE};
use crate::store::{SpatialStore, StoreError};

pub use error::VizError;

/// The layout binary; any Graphviz install provides it.
const RENDERER: &str = "neato";

/// Adjacency fan-out cap per rendered node.
const EDGES_PER_NODE: i64 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Svg,
    Pdf,
}

#[derive(Debug, Clone)]
pub enum VizScope {
    Region(Bounds),
    Zip { code: String, radius_miles: f64 },
}

#[derive(Debug, Clone)]
pub struct VizOptions {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub max_nodes: i64,
    pub scope: VizScope,
}

/// Renders the scoped slice of the network to `options.output`.
pub async fn render(store: &SpatialStore, options: &VizOptions) -> Result<PathBuf, VizError> {
    let bounds = match &options.scope {
        VizScope::Region(bounds) => *bounds,
        VizScope::Zip { code, radius_miles } => {
            let node = store.node_for_zip(code).await.map_err(|e| match e {
                StoreError::NotFound => VizError::UnknownZip(code.clone()),
                other => VizError::Store(other),
            })?;

            Bounds::around(node.position, radius_miles * METERS_PER_MILE)
        }
    };

    let nodes = store.nodes_in_bounds(bounds, options.max_nodes).await?;
    info!("visualizing {} nodes", nodes.len());

    let ids: FxHashSet<i64> = nodes.iter().map(|node| node.id).collect();
    let mut edges = Vec::new();
    for node in &nodes {
        for edge in store.outgoing_edges(node.id, EDGES_PER_NODE).await? {
            // Draw only edges landing inside the rendered slice.
            if ids.contains(&edge.to) {
                edges.push(edge);
            }
        }
    }

    let description = dot::graph_description(&nodes, &edges);
    let dot_path = options.output.with_extension("dot");
    std::fs::write(&dot_path, description)?;

    let rendered = Command::new(RENDERER)
        .arg(format!("-T{}", options.format.as_ref()))
        .arg("-o")
        .arg(&options.output)
        .arg(&dot_path)
        .output()
        .await;

    match rendered {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VizError::RendererMissing(RENDERER.to_string()))
        }
        Err(e) => Err(e.into()),
        Ok(out) if !out.status.success() => Err(VizError::RenderFailed {
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        }),
        Ok(_) => {
            info!("wrote {:?}", options.output);
            Ok(options.output.clone())
        }
    }
}
