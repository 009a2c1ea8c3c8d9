//! Batched route computation: a bounded worker pool over independent
//! route requests, aggregate statistics, and optional webhook delivery
//! of the result.

pub mod callback;
pub mod error;
pub mod model;
pub mod service;
#[cfg(test)]
mod test;

pub use callback::{CallbackClient, BATCH_ID_HEADER};
pub use error::BatchError;
pub use model::{
    BatchCalculationRequest, BatchResult, BatchStats, BatchStatus, RouteError, RouteRequest,
    RouteResult, RouteStatus,
};
pub use service::BatchRouteService;
