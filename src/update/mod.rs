//! Event-driven graph maintenance: consumes map and restriction change
//! events from the broker, applies them to the live graph as immutable
//! snapshot swaps, and publishes cache-invalidation notifications back.

pub mod consumer;
pub mod error;
pub mod event;
pub mod producer;
pub mod service;

pub use consumer::UpdateConsumer;
pub use error::UpdateError;
pub use event::{CacheInvalidation, InvalidationReason, OsmUpdate, RestrictionUpdate};
pub use producer::InvalidationProducer;
pub use service::GraphUpdateService;
