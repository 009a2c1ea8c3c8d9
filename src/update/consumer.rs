use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use rdkafka::{ClientConfig, Message};

use crate::config::BrokerConfig;
use crate::update::error::UpdateError;
use crate::update::event::{OsmUpdate, RestrictionUpdate};
use crate::update::service::GraphUpdateService;

const RECEIVE_BACKOFF: Duration = Duration::from_secs(1);

/// Consumes map/restriction change events and hands them to the
/// [`GraphUpdateService`].
pub struct UpdateConsumer {
    consumer: StreamConsumer,
    service: Arc<GraphUpdateService>,
    osm_topic: String,
    restriction_topic: String,
}

impl UpdateConsumer {
    pub fn new(
        config: &BrokerConfig,
        service: Arc<GraphUpdateService>,
    ) -> Result<UpdateConsumer, UpdateError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", config.commit_interval_ms.to_string())
            .set("fetch.wait.max.ms", config.poll_interval_ms.to_string())
            .create()?;

        consumer.subscribe(&[config.osm_topic.as_str(), config.restriction_topic.as_str()])?;

        Ok(UpdateConsumer {
            consumer,
            service,
            osm_topic: config.osm_topic.clone(),
            restriction_topic: config.restriction_topic.clone(),
        })
    }

    /// Consumes until the surrounding task is cancelled. A failed event
    /// is logged and skipped; the stream keeps draining.
    pub async fn run(&self) {
        info!(
            "update consumer listening on {} and {}",
            self.osm_topic, self.restriction_topic
        );

        loop {
            match self.consumer.recv().await {
                Ok(message) => {
                    if let Err(e) = self.handle(&message).await {
                        warn!("update event on {} failed: {e}", message.topic());
                    }
                }
                Err(e) => {
                    warn!("broker receive failed: {e}");
                    tokio::time::sleep(RECEIVE_BACKOFF).await;
                }
            }
        }
    }

    async fn handle(&self, message: &BorrowedMessage<'_>) -> Result<(), UpdateError> {
        let payload = message.payload().ok_or(UpdateError::EmptyPayload)?;
        let topic = message.topic();

        if topic == self.osm_topic {
            let update: OsmUpdate = serde_json::from_slice(payload)?;
            self.service.apply_osm_update(update).await
        } else if topic == self.restriction_topic {
            let update: RestrictionUpdate = serde_json::from_slice(payload)?;
            self.service.apply_restriction_update(update).await
        } else {
            warn!("message on unexpected topic {topic}, ignoring");
            Ok(())
        }
    }
}
