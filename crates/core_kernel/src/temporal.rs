//! Temporal utilities
//!
//! Documents arrive from the store with timestamps in three shapes: an
//! RFC-3339 string, a store-native `{seconds[, nanoseconds]}` map, or an
//! epoch-milliseconds number. This module normalizes all of them into
//! `DateTime<Utc>` at the single point of ingress, and provides the
//! half-open `TimeSlot` used by appointment scheduling.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unrecognized timestamp shape: {0}")]
    UnrecognizedTimestamp(String),

    #[error("Invalid time slot: {0} (expected HH:MM-HH:MM with start before end)")]
    InvalidTimeSlot(String),
}

/// Parses a store-native timestamp value into a UTC datetime
///
/// Accepted shapes:
/// - RFC-3339 string: `"2024-03-15T10:00:00Z"`
/// - Store timestamp map: `{"seconds": 1710496800, "nanoseconds": 0}`
/// - Epoch milliseconds number: `1710496800000`
pub fn parse_timestamp_value(value: &Value) -> Result<DateTime<Utc>, TemporalError> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| TemporalError::UnrecognizedTimestamp(s.clone())),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .and_then(Value::as_i64)
                .ok_or_else(|| TemporalError::UnrecognizedTimestamp(value.to_string()))?;
            let nanos = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            Utc.timestamp_opt(seconds, nanos)
                .single()
                .ok_or_else(|| TemporalError::UnrecognizedTimestamp(value.to_string()))
        }
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .ok_or_else(|| TemporalError::UnrecognizedTimestamp(value.to_string()))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| TemporalError::UnrecognizedTimestamp(value.to_string()))
        }
        other => Err(TemporalError::UnrecognizedTimestamp(other.to_string())),
    }
}

/// Serde adapter for timestamps in store documents
///
/// Deserializes any of the three store-native shapes; always serializes
/// back to RFC-3339 so re-written documents converge on one format.
pub mod store_timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parse_timestamp_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional timestamps in store documents
pub mod store_timestamp_opt {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => parse_timestamp_value(&v)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// A half-open appointment time slot, `[start, end)`
///
/// Stored as a `HH:MM-HH:MM` string on appointment documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Creates a slot, requiring start strictly before end
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TemporalError> {
        if start >= end {
            return Err(TemporalError::InvalidTimeSlot(format!(
                "{}-{}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Returns the slot start (inclusive)
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the slot end (exclusive)
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns true if two half-open slots overlap
    ///
    /// Back-to-back slots such as `09:00-09:30` and `09:30-10:00` do not.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for TimeSlot {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| TemporalError::InvalidTimeSlot(s.to_string()))?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M")
            .map_err(|_| TemporalError::InvalidTimeSlot(s.to_string()))?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M")
            .map_err(|_| TemporalError::InvalidTimeSlot(s.to_string()))?;
        Self::new(start, end)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
