//! Minute-precision, timezone-naive datetimes.
//!
//! Every time the user proposes or the server returns is local wall-clock
//! time with no zone attached, in the shape `YYYY-MM-DDTHH:MM`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GoMeetError, GoMeetResult, INVALID_PARAM_VALUE};

const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A local datetime truncated to the minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalMinute(NaiveDateTime);

impl LocalMinute {
    /// "Now" on the local wall clock, seconds and sub-seconds dropped.
    pub fn now() -> Self {
        Self::truncate(Local::now().naive_local())
    }

    pub fn truncate(dt: NaiveDateTime) -> Self {
        let dt = dt
            .with_second(0)
            .and_then(|d| d.with_nanosecond(0))
            .unwrap_or(dt);
        LocalMinute(dt)
    }

    /// Parse `YYYY-MM-DDTHH:MM`. A trailing `:SS` is accepted and dropped.
    pub fn parse(s: &str) -> GoMeetResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GoMeetError::MissingParam("datetime"));
        }

        let parsed = NaiveDateTime::parse_from_str(s, MINUTE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|_| GoMeetError::InvalidValue(INVALID_PARAM_VALUE.to_string()))?;

        Ok(Self::truncate(parsed))
    }

    /// Convert an RFC3339 timestamp from the availability service into the
    /// wall time it names, with the zone, seconds and fraction dropped.
    pub fn from_rfc3339(s: &str) -> GoMeetResult<Self> {
        let dt = DateTime::parse_from_rfc3339(s.trim())
            .map_err(|_| GoMeetError::InvalidValue(INVALID_PARAM_VALUE.to_string()))?;
        Ok(Self::truncate(dt.naive_local()))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Human-friendly rendering, e.g. "Tue 1 Jan 2999, 10:00".
    pub fn display_long(&self) -> String {
        self.0.format("%a %-d %b %Y, %H:%M").to_string()
    }
}

impl fmt::Display for LocalMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(MINUTE_FORMAT))
    }
}

impl FromStr for LocalMinute {
    type Err = GoMeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocalMinute::parse(s)
    }
}

impl Serialize for LocalMinute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalMinute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        LocalMinute::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// True if `time` is strictly later than `now`.
pub fn is_future(time: &LocalMinute, now: &LocalMinute) -> bool {
    time > now
}
