use std::path::PathBuf;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("extract {0:?} is not seekable; the two-pass import requires random access")]
    NotSeekable(PathBuf),

    #[error("import pipeline closed before the scan completed")]
    PipelineClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] osmpbf::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
