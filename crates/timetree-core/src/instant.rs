//! Calendar decomposition of epoch timestamps.
//!
//! A [`TimeInstant`] pairs an epoch-millisecond timestamp with the
//! timezone and resolution it should be indexed at. [`decompose`] turns
//! it into the ordered unit values (year, month-of-year, day-of-month,
//! ...) that drive tree descent, truncated at the target resolution.
//! Pure computation, no store access.

use chrono::{Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{Result, TimeTreeError};
use crate::resolution::Resolution;

/// A point in time to be indexed: epoch millis plus the timezone and
/// resolution that determine its calendar path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInstant {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Timezone the calendar units are computed in.
    pub timezone: Tz,
    /// Finest level the tree descends to for this instant.
    pub resolution: Resolution,
}

impl TimeInstant {
    /// An instant at the given epoch millis, UTC, day resolution.
    #[must_use]
    pub const fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            timezone: Tz::UTC,
            resolution: Resolution::Day,
        }
    }

    /// The current wall-clock instant (UTC, day resolution).
    #[must_use]
    pub fn now() -> Self {
        Self::new(Utc::now().timestamp_millis())
    }

    #[must_use]
    pub const fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    #[must_use]
    pub const fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Decompose into `(resolution, unit value)` pairs, coarsest first,
    /// ending at this instant's resolution.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::InvalidTimestamp`] if the timestamp is outside
    /// the representable calendar range.
    pub fn decompose(&self) -> Result<Vec<(Resolution, i64)>> {
        decompose(self.timestamp, self.timezone, self.resolution)
    }
}

/// Parse an IANA timezone identifier.
///
/// # Errors
///
/// [`TimeTreeError::UnknownTimezone`] for unrecognized identifiers.
pub fn parse_timezone(raw: &str) -> Result<Tz> {
    raw.parse()
        .map_err(|_| TimeTreeError::UnknownTimezone { raw: raw.to_string() })
}

/// Decompose an epoch-millisecond timestamp into ordered calendar unit
/// values in `timezone`, truncated at `resolution`.
///
/// # Errors
///
/// [`TimeTreeError::InvalidTimestamp`] if the timestamp is outside the
/// representable calendar range.
pub fn decompose(
    timestamp: i64,
    timezone: Tz,
    resolution: Resolution,
) -> Result<Vec<(Resolution, i64)>> {
    let dt = timezone
        .timestamp_millis_opt(timestamp)
        .single()
        .ok_or(TimeTreeError::InvalidTimestamp(timestamp))?;

    let mut units = Vec::with_capacity(Resolution::ALL.len());
    let mut res = Resolution::Year;
    loop {
        let value = match res {
            Resolution::Year => i64::from(dt.year()),
            Resolution::Month => i64::from(dt.month()),
            Resolution::Day => i64::from(dt.day()),
            Resolution::Hour => i64::from(dt.hour()),
            Resolution::Minute => i64::from(dt.minute()),
            Resolution::Second => i64::from(dt.second()),
            // chrono represents leap seconds as subsec values >= 1000
            Resolution::Millisecond => i64::from(dt.timestamp_subsec_millis().min(999)),
        };
        units.push((res, value));
        if res == resolution {
            break;
        }
        let Some(finer) = res.child() else { break };
        res = finer;
    }
    Ok(units)
}
