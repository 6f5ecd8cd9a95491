//! Time sources for scheduling and streak bookkeeping.
use crate::models::CalendarDate;
use crate::models::review_card::SECONDS_PER_DAY;
use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

pub trait Clock {
    /// Current instant in epoch seconds.
    fn now(&self) -> i64;

    /// Current calendar date in the user's time zone.
    fn today(&self) -> CalendarDate;

    /// Epoch seconds of the midnight that started `today`.
    fn start_of_today(&self) -> i64;
}

/// Wall clock, optionally shifted forward by whole days to simulate the
/// passage of time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock {
    offset_days: i64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset_days(offset_days: i64) -> Self {
        Self { offset_days }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp() + self.offset_days * SECONDS_PER_DAY
    }

    fn today(&self) -> CalendarDate {
        let today = CalendarDate::new(Local::now().date_naive());
        match u64::try_from(self.offset_days) {
            Ok(days) => today.plus_days(days),
            Err(_) => today.minus_days(self.offset_days.unsigned_abs()),
        }
    }

    fn start_of_today(&self) -> i64 {
        let midnight = self.today().naive().and_time(NaiveTime::MIN);
        // A DST jump can skip local midnight; fall back to UTC midnight then
        Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| midnight.and_utc().timestamp())
    }
}

/// Deterministic clock; `today` is the UTC date of the current instant.
#[derive(Debug)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn at(epoch_secs: i64) -> Self {
        Self {
            now: AtomicI64::new(epoch_secs),
        }
    }

    pub fn set(&self, epoch_secs: i64) {
        self.now.store(epoch_secs, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_secs(days * SECONDS_PER_DAY);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    fn today(&self) -> CalendarDate {
        let date = DateTime::<Utc>::from_timestamp(self.now(), 0)
            .map(|dt| dt.date_naive())
            .unwrap_or_default();
        CalendarDate::new(date)
    }

    fn start_of_today(&self) -> i64 {
        self.today()
            .naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> i64 {
        (**self).now()
    }

    fn today(&self) -> CalendarDate {
        (**self).today()
    }

    fn start_of_today(&self) -> i64 {
        (**self).start_of_today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today_follows_instant() {
        // 2024-05-10T23:59:59Z
        let clock = FixedClock::at(1_715_385_599);
        assert_eq!(clock.today().to_string(), "2024-05-10");

        clock.advance_secs(1);
        assert_eq!(clock.today().to_string(), "2024-05-11");

        clock.advance_days(3);
        assert_eq!(clock.today().to_string(), "2024-05-14");
        assert_eq!(clock.now(), 1_715_385_600 + 3 * SECONDS_PER_DAY);
        assert_eq!(clock.start_of_today(), 1_715_385_600 + 3 * SECONDS_PER_DAY);

        clock.advance_secs(SECONDS_PER_DAY - 1);
        assert_eq!(clock.start_of_today(), 1_715_385_600 + 3 * SECONDS_PER_DAY);
    }

    #[test]
    fn test_system_clock_offset_shifts_both_readings() {
        let base = SystemClock::new();
        let shifted = SystemClock::with_offset_days(2);

        let before = base.now();
        let ahead = shifted.now();
        assert!(ahead - before >= 2 * SECONDS_PER_DAY);
        assert!(ahead - before < 2 * SECONDS_PER_DAY + 5);

        // Could straddle midnight between the two reads; allow one day slack.
        let gap = base.today().days_between(&shifted.today());
        assert!((2..=3).contains(&gap));

        let start = shifted.start_of_today();
        assert!(start <= shifted.now());
        assert!(shifted.now() - start < 2 * SECONDS_PER_DAY);
    }
}
