use crate::store::StoreError;

/// Failure surface of the routing engine.
///
/// `NoLegalRoute` and `UnknownZip` are domain outcomes, reported
/// distinctly from `Store` transport failures so callers can tell
/// "unreachable by policy" apart from "system unavailable".
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("no legal route between the requested locations")]
    NoLegalRoute,

    #[error("node {0} is not present in the loaded graph")]
    NodeNotFound(i64),

    #[error("no node mapping for zip code {0}")]
    UnknownZip(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
