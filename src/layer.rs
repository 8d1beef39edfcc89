use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::builder::LogRecordBuilder;
use crate::logger::Logger;

/// `tracing_subscriber` layer that observes events and forwards them
/// through a [`Logger`]'s ordered pipeline.
///
/// The event's message and structured fields become the record's message,
/// its level maps onto `severity`, its target is recorded as a tag, and
/// the record is attributed to the event's own file and line. Records are
/// fire-and-forget from the layer's point of view; the queue's ordering
/// and fault isolation apply as usual.
pub struct PipelineLayer {
    logger: Logger,
    max_level: Level,
    /// Total events seen by the layer (before level filtering).
    pub total_events: Arc<AtomicU64>,
    /// Events that passed the filter and entered the pipeline.
    pub forwarded_events: Arc<AtomicU64>,
}

impl PipelineLayer {
    /// `max_level` is the most verbose level still forwarded;
    /// `Level::TRACE` forwards everything.
    pub fn new(logger: Logger, max_level: Level) -> Self {
        PipelineLayer {
            logger,
            max_level,
            total_events: Arc::new(AtomicU64::new(0)),
            forwarded_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

fn severity_for(level: &Level) -> i64 {
    match *level {
        Level::ERROR => 3,
        Level::WARN => 2,
        Level::INFO => 1,
        Level::DEBUG => 0,
        Level::TRACE => -1,
    }
}

impl<S> Layer<S> for PipelineLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if *event.metadata().level() > self.max_level {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let mut values: Vec<serde_json::Value> = Vec::new();
        if let Some(message) = message {
            values.push(serde_json::Value::String(message));
        }
        if !fields.is_empty() {
            values.push(serde_json::Value::Object(fields.into_iter().collect()));
        }

        let meta = event.metadata();
        let mut builder = LogRecordBuilder::new()
            .message(values)
            .severity(severity_for(meta.level()))
            .tag(meta.target().to_string());

        if let Some(file) = meta.file() {
            builder = builder.source(format!("{}:{}", file, meta.line().unwrap_or(0)));
        }

        // Receipt intentionally dropped: a subscriber callback has
        // nowhere to await it.
        let _ = self.logger.dispatch(builder);
        self.forwarded_events.fetch_add(1, Ordering::Relaxed);
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut BTreeMap<String, serde_json::Value>,
    message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(format!("{:?}", value)),
            );
        }
    }
}
