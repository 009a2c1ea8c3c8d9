use std::time::Duration;

use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;

use crate::config::BrokerConfig;
use crate::update::error::UpdateError;
use crate::update::event::CacheInvalidation;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes cache-invalidation notifications. Batching and
/// compression happen in the client; deliveries are asynchronous.
pub struct InvalidationProducer {
    producer: FutureProducer,
    topic: String,
}

impl InvalidationProducer {
    pub fn new(config: &BrokerConfig) -> Result<InvalidationProducer, UpdateError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("compression.type", "gzip")
            .set("linger.ms", "100")
            .set("batch.num.messages", config.batch_size.to_string())
            .create()?;

        Ok(InvalidationProducer {
            producer,
            topic: config.invalidation_topic.clone(),
        })
    }

    pub async fn publish(&self, event: &CacheInvalidation) -> Result<(), UpdateError> {
        let payload = serde_json::to_vec(event)?;
        let key = match event.reason {
            crate::update::event::InvalidationReason::OsmUpdate => "osm_update",
            crate::update::event::InvalidationReason::RestrictionUpdate => "restriction_update",
        };

        self.producer
            .send(
                FutureRecord::to(&self.topic).payload(&payload).key(key),
                DELIVERY_TIMEOUT,
            )
            .await
            .map_err(|(e, _)| UpdateError::Broker(e))?;

        Ok(())
    }
}
