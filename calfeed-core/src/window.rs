//! Query window for which events are requested.

use serde::Serialize;

use crate::error::{CalfeedError, CalfeedResult};
use crate::time::Timestamp;

/// The `[start, end]` range of one query. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    start: Timestamp,
    end: Timestamp,
}

impl QueryWindow {
    pub fn new(start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> CalfeedResult<Self> {
        let start = start.into();
        let end = end.into();

        if start.datetime() > end.datetime() {
            return Err(CalfeedError::InvalidInput(format!(
                "Window start {} is after end {}",
                start, end
            )));
        }

        Ok(QueryWindow { start, end })
    }

    /// Parse the raw `start`/`end` values a calendar widget sends.
    /// Each is `YYYY-MM-DD` or an RFC 3339 date-time.
    pub fn from_args(start: Option<&str>, end: Option<&str>) -> CalfeedResult<Self> {
        let start = start
            .ok_or_else(|| CalfeedError::InvalidInput("Missing window start".into()))
            .and_then(Timestamp::parse)?;
        let end = end
            .ok_or_else(|| CalfeedError::InvalidInput("Missing window end".into()))
            .and_then(Timestamp::parse)?;

        QueryWindow::new(start, end)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether an event spanning `[start, end]` touches this window.
    /// An event without an end is treated as instantaneous.
    pub fn overlaps(&self, start: Timestamp, end: Option<Timestamp>) -> bool {
        let end = end.unwrap_or(start);
        start.datetime() <= self.end.datetime() && end.datetime() >= self.start.datetime()
    }
}
