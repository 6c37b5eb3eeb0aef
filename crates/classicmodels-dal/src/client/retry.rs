//! Connect retry policy with exponential backoff.

use std::num::NonZeroU32;
use std::time::Duration;

/// How many times to dial and how long to wait in between.
///
/// The wait after failed attempt `i` (1-indexed) is `unit × delay^i`, so the
/// default policy (3 attempts, delay 2, one-second unit) waits 2 s and then
/// 4 s. The last allowed attempt is never followed by a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: NonZeroU32,
    delay: u32,
    unit: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(2); // 3
    pub const DEFAULT_DELAY: u32 = 2;
    pub const DEFAULT_UNIT: Duration = Duration::from_secs(1);

    #[must_use]
    pub const fn new(attempts: NonZeroU32, delay: u32) -> Self {
        Self {
            attempts,
            delay,
            unit: Self::DEFAULT_UNIT,
        }
    }

    /// Policy that dials once and never sleeps.
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self::new(NonZeroU32::MIN, Self::DEFAULT_DELAY)
    }

    /// Change the time unit the exponent is multiplied by.
    #[must_use]
    pub const fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub const fn attempts(&self) -> NonZeroU32 {
        self.attempts
    }

    #[must_use]
    pub const fn delay(&self) -> u32 {
        self.delay
    }

    #[must_use]
    pub const fn unit(&self) -> Duration {
        self.unit
    }

    /// Wait before the attempt following failed attempt `attempt`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(self.delay.saturating_pow(attempt))
    }

    /// Every wait a fully failing connect would perform, in order.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + use<> {
        let policy = *self;
        (1..policy.attempts.get()).map(move |attempt| policy.backoff(attempt))
    }

    /// Sum of [`schedule`](Self::schedule).
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        self.schedule().fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}
