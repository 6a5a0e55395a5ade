//! Timestamp codec for server-provided dates.
//!
//! The API emits local date-times without an offset
//! (`2024-03-01T09:30:00.123`), but RFC 3339 values with an offset are
//! accepted too and converted to local wall-clock time.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A wall-clock timestamp in the viewer's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(inner: NaiveDateTime) -> Self {
        Self(inner)
    }

    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Parse either a naive ISO-8601 date-time or an RFC 3339 value.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(with_offset.with_timezone(&Local).naive_local()));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Self)
    }

    /// Render with a strftime-style pattern.
    pub fn format(&self, pattern: &str) -> String {
        self.0.format(pattern).to_string()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(inner: NaiveDateTime) -> Self {
        Self(inner)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).ok_or_else(|| {
            de::Error::custom(format!("unrecognised timestamp '{raw}'"))
        })
    }
}
