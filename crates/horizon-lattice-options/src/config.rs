//! Configuration for date resolution.
//!
//! Relative date options need a little calendar context: where the fiscal
//! year starts and which time zone "today" is measured in. The configuration
//! can be built in code or loaded from a TOML file:
//!
//! ```toml
//! fiscal_year_start_month = 7
//! fiscal_year_start_day = 1
//! time_zone = "Europe/Berlin"
//! ```

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings for [`CalendarTimeService`](crate::date::CalendarTimeService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeServiceConfig {
    /// Month the fiscal year starts in (1-12).
    pub fiscal_year_start_month: u32,
    /// Day of month the fiscal year starts on (1-28).
    pub fiscal_year_start_day: u32,
    /// Measure calendar periods in UTC instead of the local zone.
    pub use_utc: bool,
    /// IANA name of the zone to measure calendar periods in, instead of the
    /// local zone.
    pub time_zone: Option<String>,
}

impl Default for TimeServiceConfig {
    fn default() -> Self {
        Self {
            fiscal_year_start_month: 1,
            fiscal_year_start_day: 1,
            use_utc: false,
            time_zone: None,
        }
    }
}

impl TimeServiceConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fiscal year start.
    pub fn with_fiscal_year_start(mut self, month: u32, day: u32) -> Self {
        self.fiscal_year_start_month = month;
        self.fiscal_year_start_day = day;
        self
    }

    /// Measure periods in UTC.
    pub fn with_utc(mut self, use_utc: bool) -> Self {
        self.use_utc = use_utc;
        self
    }

    /// Measure periods in a named zone.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    /// The configured zone, if any.
    pub fn parsed_time_zone(&self) -> Result<Option<Tz>> {
        self.time_zone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| Error::config("time_zone", format!("'{name}' is not a known time zone")))
            })
            .transpose()
    }

    /// Check that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.fiscal_year_start_month) {
            return Err(Error::config(
                "fiscal_year_start_month",
                format!("{} is not a month", self.fiscal_year_start_month),
            ));
        }
        if !(1..=28).contains(&self.fiscal_year_start_day) {
            return Err(Error::config(
                "fiscal_year_start_day",
                format!("{} must be between 1 and 28", self.fiscal_year_start_day),
            ));
        }
        self.parsed_time_zone()?;
        Ok(())
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::parse("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
