/// Spatial-store failure surface.
///
/// `NotFound` is a domain outcome (absent zip mapping, expired cache
/// row, empty node table), kept distinct from `Database` transport
/// failures and never logged as one.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
