use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::config::Config;
use crate::error::{Result, ReviewError};

/// Inclusive `[start, end]` range of submission instants that get exported.
///
/// `start` is local midnight of the configured first day. `end` is the run's
/// "now" unless it was frozen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window from configuration, ending at `until` or the current time
    pub fn from_config(config: &Config, until: Option<DateTime<Utc>>) -> Result<Self> {
        let offset = config.offset()?;
        let start = local_midnight(config.window.start, &offset)?;
        let end = until.unwrap_or_else(Utc::now);
        if end < start {
            return Err(ReviewError::Config(format!(
                "window end {} is before window start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

/// Midnight of `day` in `offset`, as a UTC instant
pub fn local_midnight(day: NaiveDate, offset: &FixedOffset) -> Result<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| offset.from_local_datetime(&midnight).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ReviewError::Config(format!("cannot place {} in offset {}", day, offset)))
}

/// Parses a `--until` value: either a bare date (end of that local day) or a
/// full RFC 3339 timestamp.
pub fn parse_until(value: &str, offset: &FixedOffset) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| ReviewError::Config(format!("invalid --until value '{}': {}", value, e)))?;
    let next = day
        .succ_opt()
        .ok_or_else(|| ReviewError::Config(format!("invalid --until value '{}'", value)))?;
    Ok(local_midnight(next, offset)? - chrono::Duration::seconds(1))
}
