//! Payment schedule advancer.
//!
//! Due dates are plain calendar dates (`NaiveDate`). There is no time zone
//! in play, so adding a day can never land on the wrong calendar day the
//! way midnight-UTC timestamps can.

use chrono::{Duration, Months, NaiveDate};

use crate::error::LendingError;
use crate::types::PaymentFrequency;
use crate::LendingResult;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Next due date after `start` for the given frequency.
///
/// `Daily` +1 day, `Weekly` +7, `Biweekly` +15, `Monthly` +1 calendar month.
/// Monthly steps clamp to the last day of a shorter month
/// (2024-01-31 becomes 2024-02-29).
pub fn next_due_date(start: NaiveDate, frequency: PaymentFrequency) -> NaiveDate {
    let advanced = match frequency {
        PaymentFrequency::Daily => start.checked_add_signed(Duration::days(1)),
        PaymentFrequency::Weekly => start.checked_add_signed(Duration::days(7)),
        PaymentFrequency::Biweekly => start.checked_add_signed(Duration::days(15)),
        PaymentFrequency::Monthly => start.checked_add_months(Months::new(1)),
    };
    // Only reachable at NaiveDate::MAX; saturate instead of panicking.
    advanced.unwrap_or(NaiveDate::MAX)
}

/// Parse a date as the host sends it: `YYYY-MM-DD` or an ISO timestamp whose
/// date part is taken as-is.
pub fn parse_date(raw: &str) -> LendingResult<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = match trimmed.get(..10) {
        Some(prefix) if trimmed.len() == 10 => prefix,
        Some(prefix) if matches!(trimmed.as_bytes().get(10), Some(b'T') | Some(b' ')) => prefix,
        _ => {
            return Err(LendingError::DateError(format!(
                "Expected YYYY-MM-DD, got '{raw}'"
            )))
        }
    };
    Ok(NaiveDate::parse_from_str(date_part, DATE_FORMAT)?)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// String-in, string-out form of [`next_due_date`].
pub fn next_due_date_str(start: &str, frequency: PaymentFrequency) -> LendingResult<String> {
    let start = parse_date(start)?;
    Ok(format_date(next_due_date(start, frequency)))
}

/// The next `count` due dates, each advanced from the previous one.
pub fn due_dates(start: NaiveDate, frequency: PaymentFrequency, count: u32) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count as usize);
    let mut current = start;
    for _ in 0..count {
        current = next_due_date(current, frequency);
        dates.push(current);
    }
    dates
}
