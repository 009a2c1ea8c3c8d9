use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("event carried no payload")]
    EmptyPayload,

    #[error(transparent)]
    Broker(#[from] rdkafka::error::KafkaError),

    #[error(transparent)]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
