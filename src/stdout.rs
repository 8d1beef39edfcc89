use async_trait::async_trait;
use std::error::Error;
use tokio::io::AsyncWriteExt;

use crate::sink::LogSink;

/// Writes each record as one newline-terminated line on the process's
/// standard output stream.
///
/// When the stream rejects a write, the payload is echoed on stderr so
/// the record is not silently lost, and the error is handed back to the
/// drain loop.
#[derive(Clone, Default)]
pub struct StdoutSink;

#[async_trait]
impl LogSink for StdoutSink {
    async fn write(&self, payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut out = tokio::io::stdout();
        let attempt = async {
            out.write_all(payload).await?;
            out.write_all(b"\n").await?;
            out.flush().await
        };

        if let Err(err) = attempt.await {
            eprintln!("{}", String::from_utf8_lossy(payload));
            return Err(Box::new(err) as Box<dyn Error + Send + Sync>);
        }
        Ok(())
    }
}
