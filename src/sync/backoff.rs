//! Reconnect backoff: doubling delay, capped, with a bounded attempt count.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    max_attempts: u32,
}

impl Backoff {
    pub const fn new(base: Duration, max: Duration, max_attempts: u32) -> Self {
        Self { base, max, max_attempts }
    }

    /// Delay before reconnect attempt `attempt` (1-based).
    ///
    /// `min(base * 2^(attempt - 1), max)`. Attempt 0 is the initial connect
    /// and has no delay.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .unwrap_or(self.max)
            .min(self.max)
    }

    /// Whether reconnect attempt `attempt` (1-based) may be made.
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}
