//! Calendar month arithmetic.

use time::{Date, Month};

/// The first day of the month `date` falls in.
pub fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The first day of the month `months` months after the month of `date`.
///
/// A negative `months` goes back. Returns `None` when the result is outside
/// the representable dates.
pub fn shift_month(date: Date, months: i64) -> Option<Date> {
    let index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;

    Date::from_calendar_date(year, month, 1).ok()
}
