use chrono::{Duration, Utc};
use serde_json::Value;

use crate::caller::CallerFrame;
use crate::record::{LogRecord, TimeSpec, DEFAULT_LIFESPAN_HOURS};

/// Render one value the way it appears inside a message: strings
/// verbatim, other primitives via their display form, objects and arrays
/// JSON-encoded.
fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        _ => value.to_string(),
    }
}

/// Flatten caller-supplied values into the record's message string.
///
/// A lone non-array value stands alone; a lone array is flattened
/// element-wise; several values are each flattened and joined with a
/// single space. The result is always a string, whatever the input shape.
pub fn build_message(values: &[Value]) -> String {
    match values {
        [Value::Array(items)] => {
            items.iter().map(flatten_value).collect::<Vec<_>>().join(" ")
        }
        [single] => flatten_value(single),
        many => many.iter().map(flatten_value).collect::<Vec<_>>().join(" "),
    }
}

/// Accumulates the optional pieces of a [`LogRecord`] and fills in the
/// defaults at build time. Doubles as the options surface of
/// [`Logger::log_custom`](crate::logger::Logger::log_custom): set any
/// subset of fields, the rest are derived.
#[derive(Debug, Clone, Default)]
pub struct LogRecordBuilder {
    values: Vec<Value>,
    timestamp: Option<TimeSpec>,
    source: Option<String>,
    severity: Option<i64>,
    lifespan: Option<TimeSpec>,
    tags: Vec<String>,
    caller: Option<CallerFrame>,
}

impl LogRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the message values wholesale.
    pub fn message(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    /// Append a single message value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn timestamp(mut self, at: impl Into<TimeSpec>) -> Self {
        self.timestamp = Some(at.into());
        self
    }

    /// Explicit source wins over any captured caller frame.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn severity(mut self, severity: i64) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn lifespan(mut self, until: impl Into<TimeSpec>) -> Self {
        self.lifespan = Some(until.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn caller(mut self, frame: CallerFrame) -> Self {
        self.caller = Some(frame);
        self
    }

    pub(crate) fn caller_if_unset(mut self, frame: CallerFrame) -> Self {
        if self.caller.is_none() {
            self.caller = Some(frame);
        }
        self
    }

    pub fn build(self) -> LogRecord {
        self.build_with_lifespan(Duration::hours(DEFAULT_LIFESPAN_HOURS))
    }

    /// Build the record, using `default_lifespan` past now for records
    /// that did not name an expiry of their own.
    pub fn build_with_lifespan(self, default_lifespan: Duration) -> LogRecord {
        let LogRecordBuilder { values, timestamp, source, severity, lifespan, tags, caller } =
            self;

        let now = Utc::now();
        let default_expiry = now + default_lifespan;

        LogRecord {
            message: build_message(&values),
            timestamp: timestamp.map(|at| at.normalize(now)).unwrap_or(now),
            source: source
                .unwrap_or_else(|| caller.unwrap_or_else(CallerFrame::unresolved).source()),
            severity: severity.unwrap_or(0),
            lifespan: lifespan
                .map(|until| until.normalize(default_expiry))
                .unwrap_or(default_expiry),
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn joins_values_with_single_spaces() {
        let message = build_message(&[json!("a"), json!("b"), json!({"x": 1})]);
        assert_eq!(message, r#"a b {"x":1}"#);
    }

    #[test]
    fn lone_array_flattens_element_wise() {
        let message = build_message(&[json!(["a", "b", {"x": 1}])]);
        assert_eq!(message, r#"a b {"x":1}"#);
    }

    #[test]
    fn lone_value_stands_alone() {
        assert_eq!(build_message(&[json!({"x": 1})]), r#"{"x":1}"#);
        assert_eq!(build_message(&[json!(42)]), "42");
        assert_eq!(build_message(&[json!(true)]), "true");
        assert_eq!(build_message(&[json!(null)]), "null");
        assert_eq!(build_message(&[json!("plain")]), "plain");
    }

    #[test]
    fn empty_input_builds_empty_message() {
        assert_eq!(build_message(&[]), "");
    }

    #[test]
    fn defaults_fill_severity_timestamp_lifespan_and_tags() {
        let before = Utc::now();
        let record = LogRecordBuilder::new().value("hello").build();
        let after = Utc::now();

        assert_eq!(record.message, "hello");
        assert_eq!(record.severity, 0);
        assert!(record.tags.is_empty());
        assert!(record.timestamp >= before && record.timestamp <= after);

        let expected_expiry = record.timestamp + Duration::hours(24);
        let drift = (record.lifespan - expected_expiry).num_seconds().abs();
        assert!(drift <= 1, "lifespan drifted {drift}s from creation + 24h");
    }

    #[test]
    fn explicit_source_wins_over_caller_frame() {
        let frame = CallerFrame {
            file_name: Some("captured.rs".to_string()),
            line_number: "7".to_string(),
            column_number: "1".to_string(),
            function_name: None,
        };
        let record = LogRecordBuilder::new()
            .value("m")
            .source("explicit.rs:99")
            .caller(frame)
            .build();
        assert_eq!(record.source, "explicit.rs:99");
    }

    #[test]
    fn caller_frame_formats_source_as_file_and_line() {
        let frame = CallerFrame {
            file_name: Some("captured.rs".to_string()),
            line_number: "7".to_string(),
            column_number: "1".to_string(),
            function_name: Some("captured".to_string()),
        };
        let record = LogRecordBuilder::new().value("m").caller(frame).build();
        assert_eq!(record.source, "captured.rs:7");
    }

    #[test]
    fn missing_attribution_reads_as_unknown() {
        let record = LogRecordBuilder::new().value("m").build();
        assert_eq!(record.source, "unknown:0");
    }

    #[test]
    fn explicit_fields_pass_through() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let record = LogRecordBuilder::new()
            .value("m")
            .timestamp(at)
            .severity(5)
            .lifespan("2026-02-01T00:00:00Z")
            .tags(vec!["auth".to_string(), "audit".to_string()])
            .build();

        assert_eq!(record.timestamp, at);
        assert_eq!(record.severity, 5);
        assert_eq!(record.lifespan, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(record.tags, vec!["auth", "audit"]);
    }

    #[test]
    fn unparseable_lifespan_falls_back_to_default_expiry() {
        let record = LogRecordBuilder::new().value("m").lifespan("whenever").build();
        let drift = (record.lifespan - (Utc::now() + Duration::hours(24)))
            .num_seconds()
            .abs();
        assert!(drift <= 1);
    }
}
