//! Reconnect delay policy.
//!
//! Delays start at a base interval, grow by a fixed multiplier after each
//! failed attempt, and saturate at a cap. A successful connection resets
//! the sequence to the base. There is no jitter: the sequence is
//! deterministic so reconnection behavior is exactly testable.

use std::time::Duration;

/// Tunable parameters for the reconnect delay sequence.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Delay before the first reconnect attempt.
    pub initial: Duration,
    /// Growth factor applied after each failed attempt.
    pub multiplier: f64,
    /// Upper bound the delay saturates at.
    pub max: Duration,
}

impl Default for BackoffPolicy {
    /// 1000 ms base, x1.5 growth, 10 000 ms cap.
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(1000),
            multiplier: 1.5,
            max: Duration::from_millis(10_000),
        }
    }
}

/// Stateful reconnect delay generator.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    current: Duration,
}

impl Backoff {
    /// Create a generator positioned at the policy's base delay.
    pub const fn new(policy: BackoffPolicy) -> Self {
        Self {
            current: policy.initial,
            policy,
        }
    }

    /// Return the delay to wait before the next attempt, then grow the
    /// interval for the attempt after it.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = grow(self.current, self.policy.multiplier, self.policy.max);
        delay
    }

    /// Reset the sequence to the base delay (call on successful connect).
    pub const fn reset(&mut self) {
        self.current = self.policy.initial;
    }

    /// The delay the next call to [`Self::next_delay`] will return.
    pub const fn current(&self) -> Duration {
        self.current
    }
}

/// Grow a delay by the multiplier, truncating fractional milliseconds,
/// and saturate at the cap.
fn grow(current: Duration, multiplier: f64, max: Duration) -> Duration {
    // Millisecond-resolution delays stay far below f64's exact integer
    // range, so the round-trip through f64 only drops the fraction.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let grown_ms = (current.as_millis() as f64 * multiplier) as u64;
    Duration::from_millis(grown_ms).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequence_matches_policy() {
        let mut backoff = Backoff::new(BackoffPolicy::default());
        let observed: Vec<u64> = (0..8)
            .map(|_| {
                let delay = backoff.next_delay();
                u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
            })
            .collect();
        assert_eq!(observed, vec![1000, 1500, 2250, 3375, 5062, 7593, 10_000, 10_000]);
    }

    #[test]
    fn reset_returns_to_base() {
        let mut backoff = Backoff::new(BackoffPolicy::default());
        let _ = backoff.next_delay();
        let _ = backoff.next_delay();
        assert_ne!(backoff.current(), Duration::from_millis(1000));

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn cap_is_respected_from_the_start() {
        let policy = BackoffPolicy {
            initial: Duration::from_millis(500),
            multiplier: 10.0,
            max: Duration::from_millis(800),
        };
        let mut backoff = Backoff::new(policy);
        assert_eq!(backoff.next_delay(), Duration::from_millis(500));
        assert_eq!(backoff.next_delay(), Duration::from_millis(800));
        assert_eq!(backoff.next_delay(), Duration::from_millis(800));
    }
}
