//! Points in time carried through to the wire with an explicit offset.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CalfeedError, CalfeedResult};

/// Wire format: ISO 8601 with a numeric offset, never `Z`.
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A date or date-time with its UTC offset.
///
/// Dates become midnight at `+00:00`. The offset is kept as given; no
/// conversion between zones happens anywhere in calfeed.
///
/// Equality covers the offset as well as the instant, so two timestamps are
/// equal exactly when they render identically. Ordering is by instant, then
/// by offset; use [`Timestamp::datetime`] to compare instants alone.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Parse either `YYYY-MM-DD` or an RFC 3339 date-time.
    pub fn parse(s: &str) -> CalfeedResult<Self> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp(dt));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Timestamp::from)
            .map_err(|_| {
                CalfeedError::InvalidInput(format!(
                    "Invalid date '{}'. Expected YYYY-MM-DD or an RFC 3339 date-time",
                    s
                ))
            })
    }

    pub fn datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn to_wire_string(&self) -> String {
        self.0.format(WIRE_FORMAT).to_string()
    }

    fn key(&self) -> (DateTime<FixedOffset>, i32) {
        (self.0, self.0.offset().local_minus_utc())
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        Timestamp(Utc.from_utc_datetime(&midnight).fixed_offset())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Timestamp(dt.fixed_offset())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}
