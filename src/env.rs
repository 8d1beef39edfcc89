//! Environment variable names used by this crate for convenient logger
//! configuration from services.
//!
//! These are purely helpers; the core pipeline types remain decoupled
//! from environment access.

use crate::init::LoggerConfig;

/// Queue capacity, e.g. `LOG_QUEUE_CAPACITY=500`.
pub const LOG_QUEUE_CAPACITY_ENV: &str = "LOG_QUEUE_CAPACITY";

/// Default record lifespan in hours, e.g. `LOG_LIFESPAN_HOURS=72`.
pub const LOG_LIFESPAN_HOURS_ENV: &str = "LOG_LIFESPAN_HOURS";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Build a [`LoggerConfig`] from the environment, falling back to the
/// documented defaults for anything unset or unparseable.
pub fn config_from_env() -> LoggerConfig {
    let defaults = LoggerConfig::default();
    let queue_capacity = env_or(LOG_QUEUE_CAPACITY_ENV, "")
        .parse()
        .unwrap_or(defaults.queue_capacity);
    let lifespan = env_or(LOG_LIFESPAN_HOURS_ENV, "")
        .parse()
        .map(chrono::Duration::hours)
        .unwrap_or(defaults.lifespan);

    LoggerConfig { queue_capacity, lifespan }
}
