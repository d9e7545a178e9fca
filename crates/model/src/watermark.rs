use crate::core::utils::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Latest modification time already present in the destination table.
/// Only records modified at or after it are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Watermark(DateTime<Utc>);

#[derive(Debug, Error)]
#[error("Invalid watermark timestamp: '{0}'")]
pub struct InvalidWatermark(pub String);

impl Watermark {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Watermark(ts)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    /// Whole seconds since the Unix epoch, UTC.
    pub fn from_epoch_seconds(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Watermark)
    }

    /// Value sent as `updated_since` to the helpdesk API.
    pub fn as_query_param(&self) -> String {
        format_timestamp(&self.0)
    }

    /// Whether a record last modified at `modified_at` is in the increment.
    pub fn admits(&self, modified_at: &DateTime<Utc>) -> bool {
        *modified_at >= self.0
    }
}

impl FromStr for Watermark {
    type Err = InvalidWatermark;

    /// Accepts epoch seconds (what the watermark statement returns) or any
    /// timestamp spelling understood by `parse_timestamp`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.trim().parse::<i64>() {
            Ok(secs) => Watermark::from_epoch_seconds(secs),
            Err(_) => parse_timestamp(s).map(Watermark),
        };
        parsed.ok_or_else(|| InvalidWatermark(s.to_string()))
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query_param())
    }
}
