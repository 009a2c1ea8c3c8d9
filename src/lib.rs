#![doc = include_str!("../README.md")]

pub mod batch;
pub mod config;
pub mod geo;
pub mod graph;
pub mod import;
pub mod store;
pub mod update;
pub mod viz;

pub use config::{Config, ConfigError};

/// Umbrella error for binaries wiring several subsystems together.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Import(#[from] import::ImportError),

    #[error(transparent)]
    Store(#[from] store::StoreError),

    #[error(transparent)]
    Routing(#[from] graph::RoutingError),

    #[error(transparent)]
    Batch(#[from] batch::BatchError),

    #[error(transparent)]
    Update(#[from] update::UpdateError),

    #[error(transparent)]
    Viz(#[from] viz::VizError),
}

pub type Result<T> = std::result::Result<T, Error>;
