use async_trait::async_trait;
use std::error::Error;

use crate::sink::LogSink;

/// A sink that simply drops every payload.
///
/// Useful for measuring the overhead of the pipeline itself without any
/// I/O, and for unit tests that don't care about output.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn write(&self, _payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
