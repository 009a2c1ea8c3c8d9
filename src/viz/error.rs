use std::process::ExitStatus;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum VizError {
    #[error("graph renderer {0:?} was not found on PATH; install graphviz to use the visualizer")]
    RendererMissing(String),

    #[error("renderer exited with {status}: {stderr}")]
    RenderFailed { status: ExitStatus, stderr: String },

    #[error("no node mapping for zip code {0}")]
    UnknownZip(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
