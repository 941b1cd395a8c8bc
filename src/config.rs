use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::env;

use crate::time_of_day::TimeOfDay;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Paris;
pub const DEFAULT_START_TIME: TimeOfDay = TimeOfDay::hm(14, 0);
pub const DEFAULT_END_TIME: TimeOfDay = TimeOfDay::hm(16, 30);
pub const DEFAULT_SLOT_DURATION_MINUTES: u32 = 30;
pub const DEFAULT_WORKING_DAYS: [u32; 5] = [1, 2, 3, 4, 5];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHoursConfig {
    /// IANA zone the opening hours are expressed in
    pub timezone: Tz,
    /// ISO weekday numbers, Monday = 1 ... Sunday = 7
    pub working_days: BTreeSet<u32>,
    /// First bookable time, inclusive
    pub start_time: TimeOfDay,
    /// Last bookable time, inclusive
    pub end_time: TimeOfDay,
    /// Spacing between offered slots, in minutes
    pub slot_duration: u32,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            working_days: DEFAULT_WORKING_DAYS.into_iter().collect(),
            start_time: DEFAULT_START_TIME,
            end_time: DEFAULT_END_TIME,
            slot_duration: DEFAULT_SLOT_DURATION_MINUTES,
        }
    }
}

/// Partial update: `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub timezone: Option<Tz>,
    pub working_days: Option<BTreeSet<u32>>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub slot_duration: Option<u32>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl BusinessHoursConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env if present, ignore if missing
        Self::from_getter(|key| env::var(key).ok())
    }

    /// Parse config from a custom getter function (for testing)
    ///
    /// Missing or empty keys take their default. A value that is present but
    /// does not parse is an error naming the key.
    pub fn from_getter<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(BusinessHoursConfig {
            timezone: match get("BUSINESS_TIMEZONE") {
                Some(name) => name
                    .parse::<Tz>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("BUSINESS_TIMEZONE '{}' is not an IANA timezone", name))?,
                None => defaults.timezone,
            },
            working_days: match get("BUSINESS_WORKING_DAYS") {
                Some(days) => parse_working_days(&days)
                    .context("BUSINESS_WORKING_DAYS must be comma separated weekday numbers 1-7")?,
                None => defaults.working_days,
            },
            start_time: match get("BUSINESS_START_TIME") {
                Some(time) => time.parse().context("BUSINESS_START_TIME must be HH:mm")?,
                None => defaults.start_time,
            },
            end_time: match get("BUSINESS_END_TIME") {
                Some(time) => time.parse().context("BUSINESS_END_TIME must be HH:mm")?,
                None => defaults.end_time,
            },
            slot_duration: match get("BUSINESS_SLOT_DURATION") {
                Some(minutes) => minutes
                    .parse()
                    .context("BUSINESS_SLOT_DURATION must be a number of minutes")?,
                None => defaults.slot_duration,
            },
        })
    }

    /// Create config from a HashMap (convenience for testing)
    pub fn from_map(map: &HashMap<&str, &str>) -> Result<Self> {
        Self::from_getter(|key| map.get(key).map(|v| v.to_string()))
    }

    /// Merge the fields present in `update` into this config.
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(tz) = update.timezone {
            self.timezone = tz;
        }
        if let Some(days) = update.working_days {
            self.working_days = days;
        }
        if let Some(start) = update.start_time {
            self.start_time = start;
        }
        if let Some(end) = update.end_time {
            self.end_time = end;
        }
        if let Some(minutes) = update.slot_duration {
            self.slot_duration = minutes;
        }
    }

    /// Validate configuration values.
    /// Returns Ok(()) if all validations pass, or Err with details of what failed.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.start_time > self.end_time {
            errors.push(format!(
                "BUSINESS_START_TIME {} is after BUSINESS_END_TIME {}.",
                self.start_time, self.end_time
            ));
        }

        if self.slot_duration == 0 {
            errors.push("BUSINESS_SLOT_DURATION must be greater than 0.".to_string());
        }

        if self.working_days.is_empty() {
            errors.push("BUSINESS_WORKING_DAYS cannot be empty.".to_string());
        }

        if let Some(bad) = self.working_days.iter().find(|d| !(1..=7).contains(*d)) {
            errors.push(format!("BUSINESS_WORKING_DAYS contains {} (expected 1-7).", bad));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )
        }
    }
}

/// Parse "1,2,3,4,5" into a weekday set
fn parse_working_days(s: &str) -> Result<BTreeSet<u32>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let day: u32 = part
                .parse()
                .with_context(|| format!("'{}' is not a weekday number", part))?;
            if !(1..=7).contains(&day) {
                bail!("weekday {} out of range", day);
            }
            Ok(day)
        })
        .collect()
}
