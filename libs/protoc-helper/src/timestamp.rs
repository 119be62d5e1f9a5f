//! Build timestamps embedded in package descriptions.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};

/// Environment variable honoured for reproducible builds.
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// Format used in the human-readable package description.
const DESCRIPTION_FORMAT: &str = "%H:%M:%S on %d %B %Y";

/// Wall-clock time at which the build procedure was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BuildTimestamp(NaiveDateTime);

impl BuildTimestamp {
    #[must_use]
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    /// Local time now.
    #[must_use]
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// `SOURCE_DATE_EPOCH` (UTC) when set to a valid epoch, local time otherwise.
    #[must_use]
    pub fn from_env_or_now() -> Self {
        let Ok(raw) = std::env::var(SOURCE_DATE_EPOCH) else {
            return Self::now();
        };
        match raw.trim().parse::<i64>().ok().and_then(|s| DateTime::from_timestamp(s, 0)) {
            Some(at) => Self(at.naive_utc()),
            None => {
                tracing::warn!(value = %raw, "Ignoring invalid {SOURCE_DATE_EPOCH}");
                Self::now()
            }
        }
    }

    #[must_use]
    pub fn naive(self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for BuildTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DESCRIPTION_FORMAT))
    }
}
