//! [`CountdownTimer`] – resettable count-up-to-threshold primitive.
//!
//! The timer records the instant of its last reset and compares the elapsed
//! time against a threshold.  It never reads the clock itself: every query
//! takes the caller's notion of "now", so a real-time loop and a test harness
//! driving synthetic instants behave identically.
//!
//! Two instances live in the supervisor state: the lost-communications timer
//! (threshold = configured timeout) and the fail-retry timer (fixed
//! [`FAIL_RETRY_TIMEOUT`]).

use std::time::{Duration, Instant};

/// Time to wait before re-checking conditions after a failed plan.
pub const FAIL_RETRY_TIMEOUT: Duration = Duration::from_secs(60);

/// Count-up timer that overflows once `threshold` has elapsed since the last
/// reset.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use tidewatch_kernel::countdown::CountdownTimer;
///
/// let t0 = Instant::now();
/// let mut timer = CountdownTimer::new(Duration::from_secs(60), t0);
///
/// assert!(!timer.overflowed(t0 + Duration::from_secs(59)));
/// assert!(timer.overflowed(t0 + Duration::from_secs(60)));
///
/// timer.reset(t0 + Duration::from_secs(61));
/// assert!(!timer.overflowed(t0 + Duration::from_secs(61)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CountdownTimer {
    threshold: Duration,
    reset_at: Instant,
}

impl CountdownTimer {
    /// Create a timer with the given `threshold`, counting from `now`.
    pub fn new(threshold: Duration, now: Instant) -> Self {
        Self {
            threshold,
            reset_at: now,
        }
    }

    /// Change the threshold.  Elapsed time is left untouched; only
    /// [`reset`][Self::reset] zeroes it.
    pub fn set_threshold(&mut self, threshold: Duration) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Zero the elapsed time as of `now`.
    pub fn reset(&mut self, now: Instant) {
        self.reset_at = now;
    }

    /// Time elapsed since the last reset.  Saturates at zero if `now` lies
    /// before the reset instant.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.reset_at)
    }

    /// Time left before the timer overflows.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.threshold.saturating_sub(self.elapsed(now))
    }

    /// `true` once the elapsed time has reached the threshold.
    pub fn overflowed(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.threshold
    }
}
