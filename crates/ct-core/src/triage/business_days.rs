//! Business-day counting between two instants.
//!
//! Instants are mapped to calendar dates in the configured office offset and
//! the weekdays in `[start_date, end_date)` are counted. Two instants on the
//! same calendar date are zero business days apart, however far apart in
//! hours.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, Utc, Weekday};
use ct_config::BusinessCalendar;

/// Business days between two instants; operand order does not matter.
pub fn business_days_between(
    a: DateTime<Utc>,
    b: DateTime<Utc>,
    calendar: &BusinessCalendar,
) -> u32 {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let offset = calendar_offset(calendar);
    weekdays_between(
        start.with_timezone(&offset).date_naive(),
        end.with_timezone(&offset).date_naive(),
    )
}

/// Weekdays `d` with `start <= d < end`. Zero when `end <= start`.
pub fn weekdays_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }

    let days = (end - start).num_days();
    let weeks = days / 7;
    let mut count = weeks * 5;

    // At most six remaining days after the full weeks.
    let Some(mut cursor) = start.checked_add_days(Days::new((weeks * 7) as u64)) else {
        return saturate(count);
    };
    while cursor < end {
        if !is_weekend(cursor) {
            count += 1;
        }
        match cursor.checked_add_days(Days::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    saturate(count)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn calendar_offset(calendar: &BusinessCalendar) -> FixedOffset {
    FixedOffset::east_opt(calendar.utc_offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix())
}

fn saturate(count: i64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
