use std::error::Error;
use std::panic::Location;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::builder::LogRecordBuilder;
use crate::caller::CallerFrame;
use crate::init::LoggerConfig;
use crate::queue::{EnqueueReceipt, Processor, QueueConfigError, SequentialQueue};
use crate::sink::LogSink;
use crate::stdout::StdoutSink;

/// Hands each serialized record to the sink, one at a time.
struct SinkProcessor {
    sink: Arc<dyn LogSink>,
}

#[async_trait]
impl Processor<Vec<u8>> for SinkProcessor {
    async fn process(&self, item: Vec<u8>) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.sink.write(&item).await
    }
}

/// Producer-facing entry point of the pipeline: builds records,
/// serializes them, and feeds the queue that owns the sink.
///
/// A `Logger` is an explicit owned instance; independent loggers have
/// independent queues and never interfere. Cloning is cheap and shares
/// the underlying queue. After a call is accepted, no failure in the
/// pipeline ever propagates back into the caller's control flow; the
/// returned [`EnqueueReceipt`] is the only way to observe a record's
/// fate.
#[derive(Clone)]
pub struct Logger {
    queue: SequentialQueue<Vec<u8>>,
    config: LoggerConfig,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>, config: LoggerConfig) -> Result<Self, QueueConfigError> {
        let queue = SequentialQueue::new(
            Arc::new(SinkProcessor { sink }),
            config.queue_capacity,
        )?;
        Ok(Logger { queue, config })
    }

    /// Logger with default settings writing to standard output.
    pub fn to_stdout() -> Self {
        Logger::new(Arc::new(StdoutSink), LoggerConfig::default())
            .expect("default config is valid")
    }

    /// Log a sequence of values as one record. Values are flattened into
    /// the message (objects and arrays JSON-encoded, primitives
    /// stringified, space-joined); everything else takes its default.
    /// The record is attributed to the call site of this method.
    ///
    /// The [`log!`](crate::log!) macro is the variadic shorthand for this.
    #[track_caller]
    pub fn log(&self, values: Vec<Value>) -> EnqueueReceipt {
        let frame = CallerFrame::from_location(Location::caller());
        self.dispatch(LogRecordBuilder::new().message(values).caller(frame))
    }

    /// Log with any subset of record fields set explicitly; the rest are
    /// filled with the same defaults as [`log`](Logger::log). An explicit
    /// `source` suppresses call-site attribution.
    #[track_caller]
    pub fn log_custom(&self, builder: LogRecordBuilder) -> EnqueueReceipt {
        let frame = CallerFrame::from_location(Location::caller());
        self.dispatch(builder.caller_if_unset(frame))
    }

    pub(crate) fn dispatch(&self, builder: LogRecordBuilder) -> EnqueueReceipt {
        let record = builder.build_with_lifespan(self.config.lifespan);
        let payload = match serde_json::to_vec(&record) {
            Ok(payload) => payload,
            Err(err) => {
                eprintln!("failed to serialize log record: {err}");
                record.message.into_bytes()
            }
        };
        self.queue.enqueue(payload)
    }

    /// Resolve once every accepted record has been written or evicted.
    pub async fn idle(&self) {
        self.queue.idle().await
    }

    /// The queue backing this logger, mainly for its counters.
    pub fn queue(&self) -> &SequentialQueue<Vec<u8>> {
        &self.queue
    }
}

/// Variadic logging shorthand: each argument is JSON-encoded and joined
/// into the record's message.
///
/// ```ignore
/// let logger = seqlog::logger::Logger::to_stdout();
/// seqlog::log!(logger, "listening on", 3000, serde_json::json!({"tls": false}));
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $logger.log(vec![$($crate::serde_json::json!($value)),*])
    };
}
