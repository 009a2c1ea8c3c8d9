/// Malformed-input failures of the batch call. Individual route
/// failures never surface here; they are carried inside the
/// [`super::BatchResult`].
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("batch request is missing an identifier")]
    MissingBatchId,

    #[error("batch {0} contains no route requests")]
    EmptyBatch(String),

    #[error("failed to build the callback HTTP client: {0}")]
    CallbackClient(#[from] reqwest::Error),
}
