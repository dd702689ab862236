//! Resolution enum covering the seven calendar granularities.
//!
//! A resolution names one level of the time tree, from [`Resolution::Year`]
//! directly under the root down to [`Resolution::Millisecond`]. The string
//! representation is the lowercase unit name; parsing is case-insensitive
//! (transport layers conventionally send uppercase).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TimeTreeError};

/// Granularity of a time point, ordered coarse to fine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl Resolution {
    /// All resolutions in descent order (coarse to fine).
    pub const ALL: [Self; 7] = [
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Millisecond,
    ];

    /// The lowercase unit name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Millisecond => "millisecond",
        }
    }

    /// The next finer resolution, or `None` for [`Self::Millisecond`].
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Year => Some(Self::Month),
            Self::Month => Some(Self::Day),
            Self::Day => Some(Self::Hour),
            Self::Hour => Some(Self::Minute),
            Self::Minute => Some(Self::Second),
            Self::Second => Some(Self::Millisecond),
            Self::Millisecond => None,
        }
    }

    /// Inclusive bounds of a valid calendar unit value at this resolution.
    /// Years are unbounded signed integers.
    #[must_use]
    pub const fn bounds(self) -> (i64, i64) {
        match self {
            Self::Year => (i64::MIN, i64::MAX),
            Self::Month => (1, 12),
            Self::Day => (1, 31),
            Self::Hour => (0, 23),
            Self::Minute | Self::Second => (0, 59),
            Self::Millisecond => (0, 999),
        }
    }

    /// Check a calendar unit value against this resolution's bounds.
    ///
    /// # Errors
    ///
    /// [`TimeTreeError::ValueOutOfRange`] when the value falls outside
    /// [`Self::bounds`].
    pub fn validate(self, value: i64) -> Result<()> {
        let (min, max) = self.bounds();
        if value < min || value > max {
            return Err(TimeTreeError::ValueOutOfRange {
                resolution: self,
                value,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = TimeTreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "month" => Ok(Self::Month),
            "day" => Ok(Self::Day),
            "hour" => Ok(Self::Hour),
            "minute" => Ok(Self::Minute),
            "second" => Ok(Self::Second),
            "millisecond" => Ok(Self::Millisecond),
            _ => Err(TimeTreeError::UnknownResolution { raw: s.to_string() }),
        }
    }
}
