//! Helpers for resolving the configured local timezone.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset for a canonical timezone name, e.g. "Europe/Brussels".
///
/// Returns `None` if `canonical_timezone` is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the timezone `canonical_timezone`.
///
/// Returns `None` if `canonical_timezone` is not a known timezone.
pub fn local_today(canonical_timezone: &str) -> Option<Date> {
    get_local_offset(canonical_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
}

#[cfg(test)]
mod tests {
    use super::{get_local_offset, local_today};

    #[test]
    fn resolves_canonical_timezone() {
        assert!(get_local_offset("Europe/Brussels").is_some());
        assert!(local_today("Etc/UTC").is_some());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert_eq!(get_local_offset("Mars/Olympus_Mons"), None);
        assert_eq!(local_today("Mars/Olympus_Mons"), None);
    }
}
