//! Injectable time source.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Days, Duration, Local, Utc};

/// Time zone in which review intervals count calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    #[default]
    Utc,
    /// The system zone. Keeps the local time of day across DST changes.
    Local,
}

impl CalendarZone {
    /// Add `days` calendar days to `now`, keeping the time of day in this zone.
    ///
    /// A local time that falls into a DST gap falls back to UTC day
    /// arithmetic. Saturates at the latest representable instant.
    pub fn add_days(self, now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
        let days = Days::new(u64::from(days));
        let shifted = match self {
            CalendarZone::Utc => now.checked_add_days(days),
            CalendarZone::Local => now
                .with_timezone(&Local)
                .checked_add_days(days)
                .map(|local| local.with_timezone(&Utc))
                .or_else(|| now.checked_add_days(days)),
        };
        shifted.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Zone whose calendar days review intervals are counted in.
    fn zone(&self) -> CalendarZone {
        CalendarZone::Utc
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn zone(&self) -> CalendarZone {
        (**self).zone()
    }
}

/// Wall-clock time. Intervals count the system's local calendar days.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn zone(&self) -> CalendarZone {
        CalendarZone::Local
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
    zone: CalendarZone,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
            zone: CalendarZone::Utc,
        }
    }

    pub fn with_zone(mut self, zone: CalendarZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn zone(&self) -> CalendarZone {
        self.zone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let start: DateTime<Utc> = "2026-03-01T09:30:00Z".parse().unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), start + Duration::days(2));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_arc_clock_delegates() {
        let start: DateTime<Utc> = "2026-03-01T09:30:00Z".parse().unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let shared: Arc<dyn Clock> = clock.clone();

        clock.advance(Duration::hours(1));
        assert_eq!(shared.now(), start + Duration::hours(1));
    }

    #[test]
    fn test_arc_clock_forwards_zone() {
        let start: DateTime<Utc> = "2026-03-01T09:30:00Z".parse().unwrap();
        let shared: Arc<dyn Clock> =
            Arc::new(FixedClock::new(start).with_zone(CalendarZone::Local));

        assert_eq!(shared.zone(), CalendarZone::Local);
        assert_eq!(SystemClock.zone(), CalendarZone::Local);
        assert_eq!(FixedClock::new(start).zone(), CalendarZone::Utc);
    }

    #[test]
    fn test_utc_days_keep_utc_time_of_day() {
        let start: DateTime<Utc> = "2026-03-28T23:30:00Z".parse().unwrap();
        let expected: DateTime<Utc> = "2026-03-31T23:30:00Z".parse().unwrap();
        assert_eq!(CalendarZone::Utc.add_days(start, 3), expected);
    }

    #[test]
    fn test_local_days_keep_local_time_of_day() {
        let start: DateTime<Utc> = "2026-06-10T09:30:00Z".parse().unwrap();
        let shifted = CalendarZone::Local.add_days(start, 6);

        let before = start.with_timezone(&Local);
        let after = shifted.with_timezone(&Local);
        assert_eq!(after.time(), before.time());
        assert_eq!(after.date_naive(), before.date_naive() + Days::new(6));
    }

    #[test]
    fn test_add_days_saturates() {
        let start: DateTime<Utc> = "2026-03-01T09:30:00Z".parse().unwrap();
        for zone in [CalendarZone::Utc, CalendarZone::Local] {
            assert_eq!(zone.add_days(start, u32::MAX), DateTime::<Utc>::MAX_UTC);
        }
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
