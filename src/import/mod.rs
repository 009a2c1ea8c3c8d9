//! Two-pass streaming ETL that converts a raw `.osm.pbf` extract into
//! the persisted node/edge tables, keeping only nodes that participate
//! in a driveable way.
//!
//! Pass 1 scans every way record and collects the IDs of nodes touched
//! by driveable roads. Pass 2 re-scans from the start (the source must
//! be seekable), materializing those nodes and the per-segment edges in
//! batches of [`importer::BATCH_SIZE`].

pub mod error;
pub mod importer;
pub mod progress;
pub mod source;
pub mod speed;
pub mod tags;
#[cfg(test)]
mod test;

pub use error::ImportError;
pub use importer::{Importer, ImportSummary};
pub use progress::{ImportCounters, ProgressReporter};
pub use source::Extract;
pub use speed::{SpeedModel, TruckSpeeds};
pub use tags::WayInfo;
