//! Trading window: weekdays between a fixed open and close in one time zone.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Weekday trading window, evaluated in a reference time zone.
///
/// Both bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketHours {
    pub timezone: Tz,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl MarketHours {
    pub fn new(timezone: Tz, open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            timezone,
            open,
            close,
        }
    }

    /// Whether `now` falls inside the window.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let t = local.time();
        self.open <= t && t <= self.close
    }

    /// Human-readable rejection for requests outside the window.
    pub fn closed_reason(&self) -> String {
        format!(
            "Orders can only be placed during market hours ({} - {} {}, Mon-Fri)",
            self.open.format("%-I:%M %p"),
            self.close.format("%-I:%M %p"),
            self.timezone.name(),
        )
    }
}

impl Default for MarketHours {
    fn default() -> Self {
        Self::new(
            chrono_tz::America::Chicago,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap_or(NaiveTime::MIN),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn closed_on_weekends() {
        let hours = MarketHours::default();
        assert!(!hours.is_open(at(2024, 2, 24, 16, 0, 0))); // Saturday 10:00 CST
        assert!(!hours.is_open(at(2024, 2, 25, 16, 0, 0))); // Sunday 10:00 CST
    }

    #[test]
    fn open_during_weekday_session() {
        let hours = MarketHours::default();
        assert!(hours.is_open(at(2024, 2, 26, 16, 0, 0))); // Monday 10:00 CST
    }

    #[test]
    fn bounds_are_inclusive_in_winter() {
        let hours = MarketHours::default();
        // CST is UTC-6
        assert!(!hours.is_open(at(2024, 1, 8, 14, 59, 59)));
        assert!(hours.is_open(at(2024, 1, 8, 15, 0, 0)));
        assert!(hours.is_open(at(2024, 1, 8, 20, 30, 0)));
        assert!(!hours.is_open(at(2024, 1, 8, 20, 30, 1)));
    }

    #[test]
    fn follows_daylight_saving() {
        let hours = MarketHours::default();
        // CDT is UTC-5
        assert!(hours.is_open(at(2024, 7, 1, 14, 0, 0)));
        assert!(!hours.is_open(at(2024, 7, 1, 13, 59, 0)));
        assert!(!hours.is_open(at(2024, 7, 1, 19, 31, 0)));
    }

    #[test]
    fn weekday_is_judged_in_reference_zone() {
        let hours = MarketHours::default();
        // Saturday 01:00 UTC is still Friday 19:00 in Chicago, after close
        assert!(!hours.is_open(at(2024, 3, 2, 1, 0, 0)));
        // Monday 03:00 UTC is Sunday night in Chicago
        assert!(!hours.is_open(at(2024, 2, 26, 3, 0, 0)));
    }

    #[test]
    fn closed_reason_text() {
        assert_eq!(
            MarketHours::default().closed_reason(),
            "Orders can only be placed during market hours (9:00 AM - 2:30 PM America/Chicago, Mon-Fri)"
        );
    }
}
