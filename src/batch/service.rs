use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{info, warn};
use tokio::sync::Semaphore;

use crate::batch::callback::CallbackClient;
use crate::batch::error::BatchError;
use crate::batch::model::{
    BatchCalculationRequest, BatchResult, BatchStats, RouteError, RouteResult, RouteStatus,
};
use crate::graph::{RouteCalculator, VehicleProfile};

const DEFAULT_VEHICLE_TYPE: &str = "truck";

/// Computes a batch of independent route requests under a bounded
/// worker pool and reports the aggregate outcome.
///
/// The pool is capped by a semaphore: no more than `max_concurrent`
/// computations are ever in flight, regardless of batch size. A batch
/// never fails because individual routes failed; only malformed input
/// surfaces as an error.
pub struct BatchRouteService<C> {
    calculator: Arc<C>,
    callback: CallbackClient,
    max_concurrent: usize,
}

impl<C> BatchRouteService<C>
where
    C: RouteCalculator + 'static,
{
    pub fn new(
        calculator: Arc<C>,
        max_concurrent: usize,
        callback_timeout: Duration,
    ) -> Result<BatchRouteService<C>, BatchError> {
        Ok(BatchRouteService {
            calculator,
            callback: CallbackClient::new(callback_timeout)?,
            max_concurrent: max_concurrent.max(1),
        })
    }

    pub async fn process(
        &self,
        request: BatchCalculationRequest,
    ) -> Result<BatchResult, BatchError> {
        if request.id.is_empty() {
            return Err(BatchError::MissingBatchId);
        }

        if request.routes.is_empty() {
            return Err(BatchError::EmptyBatch(request.id));
        }

        info!(
            "processing batch {} with {} routes (concurrency {})",
            request.id,
            request.routes.len(),
            self.max_concurrent
        );

        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let results = Arc::new(Mutex::new(Vec::with_capacity(request.routes.len())));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let mut workers = Vec::with_capacity(request.routes.len());
        for route in &request.routes {
            let route = route.clone();
            let semaphore = Arc::clone(&semaphore);
            let calculator = Arc::clone(&self.calculator);
            let results = Arc::clone(&results);
            let errors = Arc::clone(&errors);

            workers.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("route semaphore closed");

                let vehicle_type = if route.vehicle_type.is_empty() {
                    DEFAULT_VEHICLE_TYPE.to_string()
                } else {
                    route.vehicle_type.clone()
                };
                let profile = VehicleProfile::parse(&vehicle_type);

                match calculator
                    .calculate_route(&route.origin_zip, &route.dest_zip, profile)
                    .await
                {
                    Ok(summary) => {
                        results
                            .lock()
                            .expect("result lock poisoned")
                            .push(RouteResult {
                                id: route.id,
                                origin_zip: route.origin_zip,
                                dest_zip: route.dest_zip,
                                vehicle_type,
                                distance_miles: summary.distance_miles,
                                time_minutes: summary.time_minutes,
                                status: RouteStatus::Success,
                                error: None,
                                calculated_at: Utc::now(),
                            });
                    }
                    Err(e) => {
                        let message = e.to_string();

                        results
                            .lock()
                            .expect("result lock poisoned")
                            .push(RouteResult {
                                id: route.id.clone(),
                                origin_zip: route.origin_zip,
                                dest_zip: route.dest_zip,
                                vehicle_type,
                                distance_miles: 0.0,
                                time_minutes: 0.0,
                                status: RouteStatus::Error,
                                error: Some(message.clone()),
                                calculated_at: Utc::now(),
                            });

                        errors
                            .lock()
                            .expect("error lock poisoned")
                            .push(RouteError {
                                id: route.id,
                                message,
                            });
                    }
                }
            }));
        }

        // Barrier: every dispatched computation completes before the
        // aggregate is assembled.
        for worker in workers {
            if let Err(e) = worker.await {
                warn!("batch {}: route worker panicked: {e}", request.id);
            }
        }

        let results = std::mem::take(&mut *results.lock().expect("result lock poisoned"));
        let errors = std::mem::take(&mut *errors.lock().expect("error lock poisoned"));

        let successful = results
            .iter()
            .filter(|r| r.status == RouteStatus::Success)
            .count();
        let stats = BatchStats::aggregate(
            results.len(),
            successful,
            started.elapsed().as_millis() as u64,
        );

        let result = BatchResult {
            id: request.id.clone(),
            completed_at: Utc::now(),
            status: stats.status(),
            results,
            errors,
            stats,
        };

        info!(
            "batch {} {:?}: {}/{} succeeded in {}ms",
            result.id,
            result.status,
            stats.successful_routes,
            stats.total_routes,
            stats.total_time_ms
        );

        if let Some(url) = &request.callback_url {
            self.callback.deliver(url, &result).await;
        }

        Ok(result)
    }
}
