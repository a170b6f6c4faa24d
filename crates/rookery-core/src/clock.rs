//! Clock abstraction for determinism.

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the instant `window` from now, saturating at the maximum
    /// representable timestamp.
    fn deadline_after(&self, window: TimeDelta) -> DateTime<Utc> {
        let now = self.now();
        now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
