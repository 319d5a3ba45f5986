//! Source of "today" for the lending rules

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used for due dates, expiry and statistics
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a given day, at noon UTC
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()).and_utc()
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_reports_its_day() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let clock = FixedClock(day);
        assert_eq!(clock.today(), day);
        assert_eq!(clock.now().date_naive(), day);
    }

    #[test]
    fn test_mock_clock_today_follows_now() {
        let mut clock = MockClock::new();
        let instant = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap()
            .and_utc();
        clock.expect_now().return_const(instant);
        clock
            .expect_today()
            .returning(|| NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(clock.today().to_string(), "2025-03-09");
        assert_eq!(clock.now(), instant);
    }
}
