use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

/// Wall-clock source, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One instant handed out by [`MonotonicClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Stamp {
    at: DateTime<Utc>,
}

impl Stamp {
    /// Milliseconds since the Unix epoch; used as the record id.
    pub fn millis(&self) -> i64 {
        self.at.timestamp_millis()
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix.
    pub fn iso(&self) -> String {
        self.at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Millisecond clock that never repeats itself.
///
/// Each tick is `max(now, previous + 1ms)`, so two records created within the
/// same millisecond still receive distinct ids and an update always moves
/// `updatedAt` forward.
pub struct MonotonicClock<C = SystemClock> {
    source: C,
    last: AtomicI64,
}

impl MonotonicClock<SystemClock> {
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl Default for MonotonicClock<SystemClock> {
    fn default() -> Self {
        Self::system()
    }
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            last: AtomicI64::new(i64::MIN),
        }
    }

    pub fn tick(&self) -> Stamp {
        let now = self.source.now();
        let now_ms = now.timestamp_millis();

        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now_ms.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        let issued = now_ms.max(previous.saturating_add(1));

        Stamp {
            at: now + TimeDelta::milliseconds(issued - now_ms),
        }
    }
}

impl<C> std::fmt::Debug for MonotonicClock<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicClock")
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn frozen() -> MonotonicClock<FrozenClock> {
        let at = Utc
            .with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
            .single()
            .expect("valid instant");
        MonotonicClock::new(FrozenClock(at))
    }

    #[test]
    fn frozen_source_still_yields_distinct_ids() {
        let clock = frozen();
        let first = clock.tick();
        let second = clock.tick();
        let third = clock.tick();

        assert_eq!(second.millis(), first.millis() + 1);
        assert_eq!(third.millis(), first.millis() + 2);
        assert!(first.iso() < second.iso());
    }

    #[test]
    fn iso_uses_millisecond_precision_and_utc_suffix() {
        let clock = frozen();
        assert_eq!(clock.tick().iso(), "2025-03-14T09:26:53.000Z");
        assert_eq!(clock.tick().iso(), "2025-03-14T09:26:53.001Z");
    }

    #[test]
    fn system_clock_tracks_wall_time() {
        let before = Utc::now().timestamp_millis();
        let stamp = MonotonicClock::system().tick();
        assert!(stamp.millis() >= before);
    }
}
