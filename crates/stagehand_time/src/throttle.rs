//! Minimum-interval gate.

use std::time::Duration;

/// Allows an action at most once per `min_interval`.
///
/// The gate is open on the first call and afterwards only once the interval
/// has passed since the last accepted call.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Duration>,
}

impl Throttle {
    /// Create a throttle that has never fired.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// The configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Whether an action at `now` would be accepted.
    pub fn ready(&self, now: Duration) -> bool {
        match self.last {
            Some(last) => now.saturating_sub(last) >= self.min_interval,
            None => true,
        }
    }

    /// Record an action at `now`, regardless of readiness.
    pub fn mark(&mut self, now: Duration) {
        self.last = Some(now);
    }

    /// Accept and record an action if the gate is open.
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        if self.ready(now) {
            self.mark(now);
            true
        } else {
            false
        }
    }

    /// Time left until the gate opens.
    pub fn remaining(&self, now: Duration) -> Duration {
        match self.last {
            Some(last) => last.saturating_add(self.min_interval).saturating_sub(now),
            None => Duration::ZERO,
        }
    }

    /// Forget the last accepted action.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_accepted() {
        let mut throttle = Throttle::new(Duration::from_secs(5));
        assert!(throttle.try_acquire(Duration::from_secs(100)));
    }

    #[test]
    fn test_rejects_within_interval() {
        let mut throttle = Throttle::new(Duration::from_secs(5));
        assert!(throttle.try_acquire(Duration::ZERO));
        assert!(!throttle.try_acquire(Duration::from_millis(4999)));
        assert_eq!(
            throttle.remaining(Duration::from_secs(2)),
            Duration::from_secs(3)
        );
        assert!(throttle.try_acquire(Duration::from_secs(5)));
    }

    #[test]
    fn test_mark_bypasses_gate() {
        let mut throttle = Throttle::new(Duration::from_secs(5));
        throttle.mark(Duration::from_secs(1));
        assert!(!throttle.ready(Duration::from_secs(2)));
        throttle.reset();
        assert!(throttle.ready(Duration::from_secs(2)));
    }

    #[test]
    fn test_huge_interval_saturates() {
        let mut throttle = Throttle::new(Duration::MAX);
        throttle.mark(Duration::from_secs(1));
        assert!(!throttle.ready(Duration::from_secs(2)));
        assert_eq!(
            throttle.remaining(Duration::from_secs(2)),
            Duration::MAX - Duration::from_secs(2)
        );
    }
}
