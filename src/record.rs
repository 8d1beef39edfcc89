use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records default to staying relevant for one day.
pub const DEFAULT_LIFESPAN_HOURS: i64 = 24;

/// One log entry in its structured form, serialized as a single
/// newline-delimited JSON object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub severity: i64,
    pub lifespan: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// A point in time as callers are allowed to supply it: a ready instant,
/// a raw textual value, or epoch milliseconds. Whatever the shape, it is
/// normalized to UTC before it reaches a [`LogRecord`].
#[derive(Debug, Clone)]
pub enum TimeSpec {
    Instant(DateTime<Utc>),
    Raw(String),
    EpochMillis(i64),
}

impl TimeSpec {
    /// Resolve to a concrete instant, falling back to `fallback` when the
    /// raw input cannot be interpreted.
    pub fn normalize(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeSpec::Instant(at) => *at,
            TimeSpec::EpochMillis(ms) => {
                DateTime::<Utc>::from_timestamp_millis(*ms).unwrap_or(fallback)
            }
            TimeSpec::Raw(text) => parse_raw(text).unwrap_or(fallback),
        }
    }
}

fn parse_raw(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    text.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

impl From<DateTime<Utc>> for TimeSpec {
    fn from(at: DateTime<Utc>) -> Self {
        TimeSpec::Instant(at)
    }
}

impl From<&str> for TimeSpec {
    fn from(text: &str) -> Self {
        TimeSpec::Raw(text.to_string())
    }
}

impl From<String> for TimeSpec {
    fn from(text: String) -> Self {
        TimeSpec::Raw(text)
    }
}

impl From<i64> for TimeSpec {
    fn from(ms: i64) -> Self {
        TimeSpec::EpochMillis(ms)
    }
}
