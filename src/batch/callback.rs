use std::time::Duration;

use log::{debug, warn};

use crate::batch::error::BatchError;
use crate::batch::model::BatchResult;

/// Header carrying the batch identifier on callback deliveries.
pub const BATCH_ID_HEADER: &str = "X-Batch-ID";

/// Delivers completed batch results to caller-supplied URLs.
///
/// Delivery is at-most-once: a non-2xx response or transport failure is
/// logged against the batch identifier and dropped, never retried.
pub struct CallbackClient {
    http: reqwest::Client,
}

impl CallbackClient {
    pub fn new(timeout: Duration) -> Result<CallbackClient, BatchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(CallbackClient { http })
    }

    pub async fn deliver(&self, url: &str, result: &BatchResult) {
        let response = self
            .http
            .post(url)
            .header(BATCH_ID_HEADER, &result.id)
            .json(result)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!("delivered batch {} to {url}", result.id);
            }
            Ok(resp) => {
                warn!(
                    "callback for batch {} rejected by {url}: {}",
                    result.id,
                    resp.status()
                );
            }
            Err(e) => {
                warn!("callback for batch {} to {url} failed: {e}", result.id);
            }
        }
    }
}
