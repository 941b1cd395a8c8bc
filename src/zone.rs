/// Business timezone conversions
///
/// Instant -> wall clock is a plain `with_timezone`. Wall clock -> instant has
/// to pick an answer when the local time is skipped or repeated by a DST
/// transition.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::time_of_day::TimeOfDay;

/// Wall-clock view of `instant` in the business timezone.
pub fn to_business_local<Z: TimeZone>(instant: &DateTime<Z>, tz: Tz) -> DateTime<Tz> {
    instant.with_timezone(&tz)
}

/// ISO weekday of `instant` in the business timezone: Monday = 1 ... Sunday = 7.
pub fn business_weekday<Z: TimeZone>(instant: &DateTime<Z>, tz: Tz) -> u32 {
    to_business_local(instant, tz).weekday().number_from_monday()
}

/// Instant at which the business timezone's wall clock reads `local`.
///
/// Repeated local times (clocks going back) resolve to the earlier instant.
/// Skipped local times (clocks going forward) are read with the offset in
/// force before the jump, so 02:30 on a spring-forward night lands on 03:30.
pub fn from_business_local(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&local.checked_sub_signed(Duration::hours(3))?)
                .earliest()?;
            let offset = before.offset().fix().local_minus_utc();
            let utc = local.checked_sub_signed(Duration::seconds(offset.into()))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

/// Instant for `time` on calendar day `date` in the business timezone.
pub fn at_business_time(tz: Tz, date: NaiveDate, time: TimeOfDay) -> Option<DateTime<Tz>> {
    from_business_local(tz, date.and_time(time.to_naive()))
}
