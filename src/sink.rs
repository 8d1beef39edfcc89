use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for serialized log records produced by the
/// pipeline.
///
/// Implementations receive one record per call, already serialized to its
/// wire form, and are responsible for appending any record separator the
/// medium needs. The queue calls `write` from its single drain task and
/// never from the application thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Write a single serialized record.
    ///
    /// **Parameters**
    /// - `payload`: the record's wire form, without a trailing separator.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was accepted by the medium.
    /// - `Err(..)` if the write failed. The drain loop reports the error
    ///   and moves on to the next record; the failed record's data is
    ///   gone. Writes are never retried.
    async fn write(&self, payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffering the medium does, if applicable.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
