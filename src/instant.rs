//! Accepted representations of an absolute instant
//!
//! Callers hand the validator whatever they have: a chrono `DateTime` in any
//! zone, an ISO 8601 / RFC 3339 string from a form field, or Unix
//! milliseconds. Anything that cannot be turned into an instant becomes `None`,
//! which every query treats as an invalid date rather than an error.
//!
//! The instant keeps the caller's own UTC offset. That offset is the "ambient
//! calendar" used where a query works on the caller's date instead of the
//! business timezone's (slot construction, day stepping).

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

pub trait AsInstant {
    fn as_instant(&self) -> Option<DateTime<FixedOffset>>;
}

impl<Tz: TimeZone> AsInstant for DateTime<Tz> {
    fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        Some(self.with_timezone(&self.offset().fix()))
    }
}

impl AsInstant for str {
    fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        parse_instant(self)
    }
}

impl AsInstant for String {
    fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        parse_instant(self)
    }
}

/// Unix timestamp in milliseconds.
impl AsInstant for i64 {
    fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::<Utc>::from_timestamp_millis(*self).map(|dt| dt.fixed_offset())
    }
}

impl<T: AsInstant> AsInstant for Option<T> {
    fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        self.as_ref().and_then(AsInstant::as_instant)
    }
}

impl<T: AsInstant + ?Sized> AsInstant for &T {
    fn as_instant(&self) -> Option<DateTime<FixedOffset>> {
        (**self).as_instant()
    }
}

/// Parse a date/time string into an instant.
///
/// Accepted forms:
/// - RFC 3339 with offset or `Z` ("2024-01-15T23:00:00Z")
/// - date only ("2024-01-15"), read as midnight UTC
/// - date and time without offset ("2024-01-15T15:00:00"), read in the
///   machine's local zone
pub fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).fixed_offset());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset());
        }
    }

    None
}
