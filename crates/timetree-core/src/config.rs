//! Configuration surface consumed by the core.
//!
//! A bootstrap/façade layer resolves these knobs (from a TOML file or
//! its own mechanism) and passes them into core calls as plain
//! parameters; nothing in the index reads configuration ambiently.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use chrono_tz::Tz;

use crate::error;
use crate::instant::{TimeInstant, parse_timezone};
use crate::resolution::Resolution;

/// Defaults applied to inbound requests that omit a parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeTreeConfig {
    /// Finest resolution the tree descends to by default.
    #[serde(default = "default_resolution")]
    pub resolution: Resolution,
    /// IANA timezone identifier for calendar decomposition.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Edge type used for event attachment.
    #[serde(default = "default_relationship")]
    pub relationship: String,
    /// Node property the auto-attach path reads the epoch millis from.
    #[serde(default = "default_timestamp_property")]
    pub timestamp_property: String,
    /// Whether newly created domain entities are attached automatically.
    #[serde(default)]
    pub auto_attach: bool,
}

impl Default for TimeTreeConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            timezone: default_timezone(),
            relationship: default_relationship(),
            timestamp_property: default_timestamp_property(),
            auto_attach: false,
        }
    }
}

impl TimeTreeConfig {
    /// Parse the configured timezone identifier.
    ///
    /// # Errors
    ///
    /// [`crate::TimeTreeError::UnknownTimezone`] when the identifier is
    /// not a known IANA zone.
    pub fn tz(&self) -> error::Result<Tz> {
        parse_timezone(&self.timezone)
    }

    /// Build a [`TimeInstant`] for a timestamp using this config's
    /// defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Self::tz`].
    pub fn instant(&self, timestamp: i64) -> error::Result<TimeInstant> {
        Ok(TimeInstant::new(timestamp)
            .with_timezone(self.tz()?)
            .with_resolution(self.resolution))
    }
}

fn default_resolution() -> Resolution {
    Resolution::Day
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_relationship() -> String {
    "AT_TIME".to_string()
}

fn default_timestamp_property() -> String {
    "timestamp".to_string()
}

/// Load configuration from a TOML file, falling back to defaults when
/// the file does not exist.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<TimeTreeConfig> {
    if !path.exists() {
        return Ok(TimeTreeConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TimeTreeConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = TimeTreeConfig::default();
        assert_eq!(cfg.resolution, Resolution::Day);
        assert_eq!(cfg.timezone, "UTC");
        assert_eq!(cfg.relationship, "AT_TIME");
        assert_eq!(cfg.timestamp_property, "timestamp");
        assert!(!cfg.auto_attach);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: TimeTreeConfig =
            toml::from_str("resolution = \"hour\"\nauto_attach = true\n").unwrap();
        assert_eq!(cfg.resolution, Resolution::Hour);
        assert!(cfg.auto_attach);
        assert_eq!(cfg.timezone, "UTC");
        assert_eq!(cfg.relationship, "AT_TIME");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.resolution, Resolution::Day);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timetree.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "resolution = \"minute\"").unwrap();
        writeln!(f, "timezone = \"Europe/London\"").unwrap();
        writeln!(f, "relationship = \"SENT_ON\"").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.resolution, Resolution::Minute);
        assert_eq!(cfg.timezone, "Europe/London");
        assert_eq!(cfg.relationship, "SENT_ON");
        assert!(cfg.tz().is_ok());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "resolution = \"fortnight\"").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn bad_timezone_surfaces_on_use() {
        let cfg = TimeTreeConfig {
            timezone: "Mars/Olympus".into(),
            ..TimeTreeConfig::default()
        };
        assert!(cfg.tz().is_err());
        assert!(cfg.instant(0).is_err());
    }

    #[test]
    fn instant_applies_config_defaults() {
        let cfg = TimeTreeConfig {
            resolution: Resolution::Second,
            ..TimeTreeConfig::default()
        };
        let i = cfg.instant(1_000).unwrap();
        assert_eq!(i.resolution, Resolution::Second);
        assert_eq!(i.timezone, Tz::UTC);
        assert_eq!(i.timestamp, 1_000);
    }
}
