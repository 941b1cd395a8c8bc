//! Wall-clock time of day in "H:mm" / "HH:mm" 24-hour notation
//!
//! Opening hours, slot times and the time-of-day half of a booking are all
//! carried as minutes since midnight so they compare with plain integer
//! ordering. Parsing is strict: one or two hour digits, exactly two minute
//! digits, nothing else.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeError {
    #[error("expected H:mm or HH:mm, got {0:?}")]
    Format(String),
    #[error("hour {0} out of range (00-23)")]
    Hour(u32),
    #[error("minute {0} out of range (00-59)")]
    Minute(u32),
}

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    minutes: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self {
                minutes: hour * 60 + minute,
            })
        } else {
            None
        }
    }

    /// For crate constants: an out-of-range literal fails const evaluation.
    pub(crate) const fn hm(hour: u32, minute: u32) -> Self {
        assert!(hour < 24 && minute < 60, "time of day out of range");
        Self {
            minutes: hour * 60 + minute,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self { minutes })
    }

    /// Truncates seconds and sub-seconds.
    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            minutes: time.hour() * 60 + time.minute(),
        }
    }

    pub fn minutes(self) -> u32 {
        self.minutes
    }

    pub fn hour(self) -> u32 {
        self.minutes / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes % 60
    }

    pub fn to_naive(self) -> NaiveTime {
        // minutes < 1440 is upheld by every constructor
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

/// Parse a strict "H:mm" / "HH:mm" string into minutes since midnight.
pub fn parse_minutes(s: &str) -> Result<u32, ParseTimeError> {
    let format_err = || ParseTimeError::Format(s.to_string());

    let (hours, minutes) = s.split_once(':').ok_or_else(format_err)?;

    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if hours.is_empty() || hours.len() > 2 || !digits_only(hours) {
        return Err(format_err());
    }
    if minutes.len() != 2 || !digits_only(minutes) {
        return Err(format_err());
    }

    let hour: u32 = hours.parse().map_err(|_| format_err())?;
    let minute: u32 = minutes.parse().map_err(|_| format_err())?;

    if hour > 23 {
        return Err(ParseTimeError::Hour(hour));
    }
    if minute > 59 {
        return Err(ParseTimeError::Minute(minute));
    }

    Ok(hour * 60 + minute)
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_minutes(s).map(|minutes| Self { minutes })
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseTimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}



/// Kani formal verification proofs
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    #[kani::unwind(7)]
    fn parsed_minutes_within_day() {
        let bytes: [u8; 5] = kani::any();
        if let Ok(s) = std::str::from_utf8(&bytes) {
            if let Ok(m) = parse_minutes(s) {
                kani::assert(m < MINUTES_PER_DAY, "parsed time must be within a day");
            }
        }
    }

    #[kani::proof]
    fn new_matches_from_minutes() {
        let hour: u32 = kani::any();
        let minute: u32 = kani::any();
        kani::assume(hour < 24 && minute < 60);
        let a = TimeOfDay::new(hour, minute);
        let b = TimeOfDay::from_minutes(hour * 60 + minute);
        kani::assert(a == b, "constructors must agree");
    }
}
