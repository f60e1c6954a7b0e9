//! Injectable time source for time-driven task classification.
//!
//! # Responsibility
//! - Provide "current time" to `TaskManager` and task predicates.
//! - Allow simulated time so overdue/due-soon rules can be checked without
//!   depending on the real wall clock.
//!
//! # Invariants
//! - Every read of `Clock::now()` reflects the time at call time; callers
//!   must not cache it across operations.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of the current instant in UTC.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Simulated time source for tests and replays.
///
/// Interior mutability lets a caller move time while a `TaskManager` owns a
/// shared handle (`Rc<FixedClock>` or `&FixedClock`).
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Jumps to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// Moves time by `delta` (negative values move backwards).
    ///
    /// Saturates at the representable `DateTime<Utc>` range.
    pub fn advance(&self, delta: Duration) {
        let current = self.now.get();
        let next = current.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        self.now.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, SystemClock};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::rc::Rc;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0)
            .single()
            .expect("valid fixed instant")
    }

    #[test]
    fn fixed_clock_set_and_advance() {
        let clock = FixedClock::new(instant());
        assert_eq!(clock.now(), instant());

        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), instant() + Duration::minutes(90));

        clock.advance(Duration::hours(-2));
        assert_eq!(clock.now(), instant() - Duration::minutes(30));

        clock.set(instant());
        assert_eq!(clock.now(), instant());
    }

    #[test]
    fn fixed_clock_advance_saturates() {
        let clock = FixedClock::new(DateTime::<Utc>::MAX_UTC - Duration::days(1));
        clock.advance(Duration::days(3650));
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn shared_handles_observe_the_same_time() {
        let clock = Rc::new(FixedClock::new(instant()));
        let handle: Rc<FixedClock> = Rc::clone(&clock);
        clock.advance(Duration::seconds(5));
        assert_eq!(handle.now(), instant() + Duration::seconds(5));
        assert_eq!((&*clock).now(), handle.now());
    }

    #[test]
    fn system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }
}
