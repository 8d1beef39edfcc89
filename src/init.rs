use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::layer::PipelineLayer;
use crate::logger::Logger;
use crate::queue::{QueueConfigError, DEFAULT_CAPACITY};
use crate::record::DEFAULT_LIFESPAN_HOURS;
use crate::sink::LogSink;

/// Settings for a [`Logger`] instance.
///
/// **Fields**
/// - `queue_capacity`: number of records allowed to wait in the queue
///   before the oldest ones are discarded.
/// - `lifespan`: how long past creation a record stays relevant when the
///   caller does not name an expiry.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub queue_capacity: usize,
    pub lifespan: chrono::Duration,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_CAPACITY,
            lifespan: chrono::Duration::hours(DEFAULT_LIFESPAN_HOURS),
        }
    }
}

/// Logger with default settings writing to standard output. This is the
/// recommended entrypoint for typical services.
pub fn stdout_logger() -> Logger {
    Logger::to_stdout()
}

/// Build a logger over an arbitrary sink with explicit settings.
pub fn logger_with_config(
    sink: Arc<dyn LogSink>,
    config: LoggerConfig,
) -> Result<Logger, QueueConfigError> {
    Logger::new(sink, config)
}

/// Install a [`PipelineLayer`] over `logger` as the global `tracing`
/// subscriber, so every `tracing` event in the process down to
/// `max_level` flows through the ordered pipeline.
pub fn init_tracing_bridge(logger: Logger, max_level: Level) {
    let layer = PipelineLayer::new(logger, max_level);
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.lifespan, chrono::Duration::hours(24));
    }
}
