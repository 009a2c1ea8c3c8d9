//! Environment-driven configuration. Binaries load a `.env` file first
//! (via `dotenv`), then read the variables below; unset optionals fall
//! back to deployment defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::store::StoreConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Broker connectivity and topic layout for the update path.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub brokers: String,
    pub group_id: String,
    pub osm_topic: String,
    pub restriction_topic: String,
    pub invalidation_topic: String,
    pub poll_interval_ms: u64,
    pub commit_interval_ms: u64,
    pub batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_concurrent: usize,
    pub callback_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub broker: BrokerConfig,
    pub batch: BatchConfig,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Ok(Config {
            store: StoreConfig {
                url: require("DATABASE_URL")?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 16)?,
                max_lifetime: Duration::from_secs(parse_or("DATABASE_MAX_LIFETIME_SECS", 1_800)?),
                idle_timeout: Duration::from_secs(parse_or("DATABASE_IDLE_TIMEOUT_SECS", 600)?),
            },
            broker: BrokerConfig {
                brokers: var_or("KAFKA_BROKERS", "localhost:9092"),
                group_id: var_or("KAFKA_GROUP_ID", "routing-graph-updates"),
                osm_topic: var_or("KAFKA_OSM_TOPIC", "osm-updates"),
                restriction_topic: var_or("KAFKA_RESTRICTION_TOPIC", "restriction-updates"),
                invalidation_topic: var_or("KAFKA_INVALIDATION_TOPIC", "route-cache-invalidations"),
                poll_interval_ms: parse_or("KAFKA_POLL_INTERVAL_MS", 500)?,
                commit_interval_ms: parse_or("KAFKA_COMMIT_INTERVAL_MS", 5_000)?,
                batch_size: parse_or("KAFKA_BATCH_SIZE", 1_000)?,
            },
            batch: BatchConfig {
                max_concurrent: parse_or("BATCH_MAX_CONCURRENT", 8)?,
                callback_timeout: Duration::from_secs(parse_or("BATCH_CALLBACK_TIMEOUT_SECS", 30)?),
            },
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
