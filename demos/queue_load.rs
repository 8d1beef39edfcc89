use std::sync::Arc;
use std::time::Instant;

use seqlog::init::{logger_with_config, LoggerConfig};
use seqlog::log;
use seqlog::noop_sink::NoopSink;

#[tokio::main]
async fn main() {
    let config = LoggerConfig { queue_capacity: 10_000, ..LoggerConfig::default() };
    let logger = logger_with_config(Arc::new(NoopSink), config).expect("valid config");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        log!(logger, "load test record", i);
    }
    logger.idle().await;

    let elapsed = start.elapsed();
    println!(
        "pipeline drained {} of {} records in {:?} (~{:.0} rec/s, {} evicted)",
        logger.queue().processed_items(),
        n,
        elapsed,
        logger.queue().processed_items() as f64 / elapsed.as_secs_f64(),
        logger.queue().evicted_items(),
    );
}
