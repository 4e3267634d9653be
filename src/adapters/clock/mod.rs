//! Clock adapters.
//!
//! - `SystemClock` - Wall-clock time
//! - `ManualClock` - Settable time for eviction tests

use chrono::Duration;
use parking_lot::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Creates a clock frozen at the unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(Timestamp::from_unix_millis(0))
    }

    /// Jumps to `instant`.
    pub fn set(&self, instant: Timestamp) {
        *self.current.lock() = instant;
    }

    /// Moves forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock();
        *current = current.plus(duration);
    }

    /// Moves forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_stays_put_until_advanced() {
        let clock = ManualClock::at_epoch();
        assert_eq!(clock.now(), clock.now());

        clock.advance_secs(90);

        assert_eq!(clock.now().as_unix_millis(), 90_000);
    }

    #[test]
    fn manual_clock_can_jump() {
        let clock = ManualClock::at_epoch();
        clock.set(Timestamp::from_unix_millis(42));
        assert_eq!(clock.now().as_unix_millis(), 42);
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(!second.is_before(&first));
    }
}
