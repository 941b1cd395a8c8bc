//! Business hours and appointment slot validation
//!
//! Every query answers from the configured opening window in the business
//! timezone. Malformed input (an unparseable instant, a bad "HH:mm" string, a
//! misconfigured window) never surfaces as an error: the query returns its most
//! conservative answer and logs at debug level.

use chrono::{DateTime, Datelike, Days, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{BusinessHoursConfig, ConfigUpdate};
use crate::instant::AsInstant;
use crate::time_of_day::{parse_minutes, TimeOfDay};
use crate::zone;

/// How far `next_business_day` looks before giving up
pub const NEXT_BUSINESS_DAY_HORIZON: u64 = 14;

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A bookable appointment time on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub time: TimeOfDay,
    /// Always true here; conflicts with existing bookings are checked elsewhere
    pub available: bool,
    pub datetime: DateTime<Tz>,
}

/// Why `check_booking` refused an instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingRejection {
    #[error("not a valid date")]
    InvalidInstant,
    #[error("closed on {weekday}")]
    ClosedDay { weekday: &'static str },
    #[error("{time} is outside opening hours {start}-{end}")]
    OutsideHours {
        time: TimeOfDay,
        start: TimeOfDay,
        end: TimeOfDay,
    },
    #[error("already in the past")]
    InPast,
}

#[derive(Debug, Clone, Default)]
pub struct BusinessHoursValidator {
    config: BusinessHoursConfig,
}

impl BusinessHoursValidator {
    pub fn new(config: BusinessHoursConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("Business hours misconfigured, queries will refuse bookings: {:#}", e);
        }
        Self { config }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(BusinessHoursConfig::from_env()?))
    }

    pub fn config(&self) -> &BusinessHoursConfig {
        &self.config
    }

    /// Merge `update` into the current config; absent fields are preserved.
    pub fn update_config(&mut self, update: ConfigUpdate) {
        if update.is_empty() {
            return;
        }
        self.config.apply(update);
        info!("Business hours updated: {}", self.describe());
        if let Err(e) = self.config.validate() {
            warn!("Business hours misconfigured after update: {:#}", e);
        }
    }

    /// True if the instant falls on a working day in the business timezone.
    pub fn is_valid_business_day(&self, instant: impl AsInstant) -> bool {
        match instant.as_instant() {
            Some(instant) => self.is_open_on(&instant),
            None => {
                debug!("Rejecting business day check: invalid date");
                false
            }
        }
    }

    /// True if `time` is a well-formed "H:mm"/"HH:mm" inside the opening window.
    ///
    /// Both bounds are inclusive.
    pub fn is_valid_business_time(&self, time: &str) -> bool {
        match parse_minutes(time) {
            Ok(minutes) => self.within_hours(minutes),
            Err(e) => {
                debug!("Rejecting business time {:?}: {}", time, e);
                false
            }
        }
    }

    /// Day taken from `instant`, time of day taken as given.
    ///
    /// `time` is not converted: it is read as the business timezone's wall
    /// clock. Callers holding only an instant should use
    /// [`is_valid_business_date_time_object`](Self::is_valid_business_date_time_object)
    /// or [`check_booking`](Self::check_booking).
    pub fn is_valid_business_date_time(&self, instant: impl AsInstant, time: &str) -> bool {
        self.is_valid_business_day(instant) && self.is_valid_business_time(time)
    }

    /// Day and time of day both derived from `instant` in the business timezone.
    ///
    /// Seconds are truncated, so 16:30:59 is still inside a window ending at 16:30.
    pub fn is_valid_business_date_time_object(&self, instant: impl AsInstant) -> bool {
        match instant.as_instant() {
            Some(instant) => self.classify(&instant).is_ok(),
            None => {
                debug!("Rejecting business date-time check: invalid date");
                false
            }
        }
    }

    /// Slots from start to end time inclusive, `slot_duration` minutes apart.
    ///
    /// Wall-clock times that do not exist on the day (DST spring forward) are
    /// left out, so slot instants are unique and strictly ascending.
    ///
    /// The working-day check uses the business timezone. Slot instants combine
    /// the calendar date of `instant` as the caller expressed it with each
    /// slot's wall-clock time in the business timezone.
    pub fn available_time_slots(&self, instant: impl AsInstant) -> Vec<TimeSlot> {
        let Some(instant) = instant.as_instant() else {
            debug!("No slots: invalid date");
            return Vec::new();
        };

        if !self.is_open_on(&instant) {
            return Vec::new();
        }

        let step = self.config.slot_duration;
        if step == 0 {
            warn!("No slots: slot duration is 0");
            return Vec::new();
        }

        let tz = self.config.timezone;
        let date = instant.date_naive();
        let end = self.config.end_time.minutes();

        let mut slots = Vec::new();
        let mut minutes = self.config.start_time.minutes();
        while minutes <= end {
            if let Some(time) = TimeOfDay::from_minutes(minutes) {
                match zone::at_business_time(tz, date, time) {
                    // A wall clock skipped by a DST jump would land on a later slot's instant
                    Some(datetime) if TimeOfDay::from_naive(datetime.time()) == time => {
                        slots.push(TimeSlot {
                            time,
                            available: true,
                            datetime,
                        })
                    }
                    Some(_) => debug!("Skipping slot {} on {}: skipped by DST in {}", time, date, tz),
                    None => debug!("Skipping slot {} on {}: not representable in {}", time, date, tz),
                }
            }
            match minutes.checked_add(step) {
                Some(next) => minutes = next,
                None => break,
            }
        }

        slots
    }

    /// First working day after `from`, stepping one calendar day at a time in
    /// the caller's offset. `None` if nothing opens within
    /// [`NEXT_BUSINESS_DAY_HORIZON`] days.
    pub fn next_business_day(&self, from: impl AsInstant) -> Option<DateTime<FixedOffset>> {
        let Some(from) = from.as_instant() else {
            debug!("No next business day: invalid date");
            return None;
        };

        let found = (1..=NEXT_BUSINESS_DAY_HORIZON)
            .filter_map(|n| from.checked_add_days(Days::new(n)))
            .find(|day| self.is_open_on(day));

        if found.is_none() {
            warn!(
                "No business day within {} days of {} (working days: {:?})",
                NEXT_BUSINESS_DAY_HORIZON, from, self.config.working_days
            );
        }
        found
    }

    /// True if `instant` is before the current time. Invalid dates count as past.
    pub fn is_in_past(&self, instant: impl AsInstant) -> bool {
        self.is_in_past_at(instant, Utc::now())
    }

    /// Testable version: compare against a supplied `now`
    pub fn is_in_past_at(&self, instant: impl AsInstant, now: DateTime<Utc>) -> bool {
        match instant.as_instant() {
            Some(instant) => instant < now,
            None => {
                debug!("Treating invalid date as past");
                true
            }
        }
    }

    /// Full booking check on a single instant, with the reason for a refusal.
    pub fn check_booking(&self, instant: impl AsInstant) -> Result<(), BookingRejection> {
        self.check_booking_at(instant, Utc::now())
    }

    /// Testable version: compare against a supplied `now`
    pub fn check_booking_at(
        &self,
        instant: impl AsInstant,
        now: DateTime<Utc>,
    ) -> Result<(), BookingRejection> {
        let instant = instant.as_instant().ok_or(BookingRejection::InvalidInstant)?;
        self.classify(&instant)?;
        if instant < now {
            return Err(BookingRejection::InPast);
        }
        Ok(())
    }

    /// Earliest slot at or after both `from` and the current time, searched
    /// over the [`NEXT_BUSINESS_DAY_HORIZON`] calendar days that follow.
    pub fn next_available_slot(&self, from: impl AsInstant) -> Option<TimeSlot> {
        self.next_available_slot_at(from, Utc::now())
    }

    /// Testable version: compare against a supplied `now`
    pub fn next_available_slot_at(&self, from: impl AsInstant, now: DateTime<Utc>) -> Option<TimeSlot> {
        let from = from.as_instant()?;
        // Keep the caller's offset so days are stepped in their calendar
        let start = from.max(now.with_timezone(from.offset()));
        let earliest = start.with_timezone(&Utc);

        let found = (0..=NEXT_BUSINESS_DAY_HORIZON)
            .filter_map(|n| start.checked_add_days(Days::new(n)))
            .find_map(|day| {
                self.available_time_slots(day)
                    .into_iter()
                    .find(|slot| slot.datetime.with_timezone(&Utc) >= earliest)
            });

        if found.is_none() {
            debug!("No open slot within {} days of {}", NEXT_BUSINESS_DAY_HORIZON, start);
        }
        found
    }

    /// One-line summary, e.g. "Mon-Fri 14:00-16:30 every 30 min (Europe/Paris)"
    pub fn describe(&self) -> String {
        format!(
            "{} {}-{} every {} min ({})",
            format_working_days(&self.config.working_days),
            self.config.start_time,
            self.config.end_time,
            self.config.slot_duration,
            self.config.timezone
        )
    }

    fn is_open_on(&self, instant: &DateTime<FixedOffset>) -> bool {
        let weekday = zone::business_weekday(instant, self.config.timezone);
        self.config.working_days.contains(&weekday)
    }

    fn within_hours(&self, minutes: u32) -> bool {
        self.config.start_time.minutes() <= minutes && minutes <= self.config.end_time.minutes()
    }

    /// Day and time-of-day checks in the business timezone, without the past check
    fn classify(&self, instant: &DateTime<FixedOffset>) -> Result<(), BookingRejection> {
        let local = zone::to_business_local(instant, self.config.timezone);
        let weekday = local.weekday().number_from_monday();
        if !self.config.working_days.contains(&weekday) {
            return Err(BookingRejection::ClosedDay {
                weekday: WEEKDAY_NAMES[local.weekday().num_days_from_monday() as usize],
            });
        }

        let time = TimeOfDay::from_naive(local.time());
        if !self.within_hours(time.minutes()) {
            return Err(BookingRejection::OutsideHours {
                time,
                start: self.config.start_time,
                end: self.config.end_time,
            });
        }

        Ok(())
    }
}

/// "Mon-Fri", "Mon,Wed,Fri", "Mon-Wed,Sat" or "closed"
fn format_working_days(days: &std::collections::BTreeSet<u32>) -> String {
    let valid: Vec<u32> = days.iter().copied().filter(|d| (1..=7).contains(d)).collect();
    if valid.is_empty() {
        return "closed".to_string();
    }

    let name = |d: u32| WEEKDAY_NAMES[(d - 1) as usize];
    let mut runs: Vec<String> = Vec::new();
    let mut i = 0;
    while i < valid.len() {
        let start = valid[i];
        let mut end = start;
        while i + 1 < valid.len() && valid[i + 1] == end + 1 {
            i += 1;
            end = valid[i];
        }
        runs.push(if end - start >= 2 {
            format!("{}-{}", name(start), name(end))
        } else if end > start {
            format!("{},{}", name(start), name(end))
        } else {
            name(start).to_string()
        });
        i += 1;
    }

    runs.join(",")
}
