//! Durable, geography-indexed storage of the network and of cached
//! route results, backed by a PostGIS-enabled PostgreSQL instance.

pub mod error;
pub mod postgres;
pub mod record;

pub use error::StoreError;
pub use postgres::{SpatialStore, StoreConfig};
pub use record::{CachedRoute, EdgeRecord, NodeRecord, CACHE_EXPIRY_HOURS};
