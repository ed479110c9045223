//! Single-slot repeating timer.

use std::fmt;
use std::time::Duration;

/// Shortest interval a ticker accepts. Zero would fire unboundedly.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Identity of one started timer. Restarting produces a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTimer {
    id: TimerId,
    interval: Duration,
    next_due: Duration,
}

/// A repeating timer with exactly one slot.
///
/// `start` cancels whatever occupies the slot before installing the new
/// timer. `poll` reports how many intervals have elapsed since the previous
/// poll, so a late host loop catches up instead of silently dropping ticks.
#[derive(Debug, Default)]
pub struct Ticker {
    slot: Option<ActiveTimer>,
    next_id: u64,
}

impl Ticker {
    /// Create an idle ticker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer, replacing any active one.
    ///
    /// The first tick is due one `interval` after `now`.
    pub fn start(&mut self, now: Duration, interval: Duration) -> TimerId {
        if let Some(previous) = self.slot.take() {
            log::debug!("Ticker: cancelled {} before restart", previous.id);
        }

        let interval = interval.max(MIN_INTERVAL);
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.slot = Some(ActiveTimer {
            id,
            interval,
            next_due: now + interval,
        });
        log::trace!("Ticker: started {} every {:?}", id, interval);
        id
    }

    /// Cancel the active timer. Returns false if nothing was running.
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some(timer) => {
                log::trace!("Ticker: cancelled {}", timer.id);
                true
            }
            None => false,
        }
    }

    /// Whether a timer occupies the slot.
    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    /// Id of the active timer, if any.
    pub fn active_id(&self) -> Option<TimerId> {
        self.slot.map(|t| t.id)
    }

    /// Interval of the active timer, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.slot.map(|t| t.interval)
    }

    /// Number of ticks that fired up to `now`.
    pub fn poll(&mut self, now: Duration) -> u32 {
        let Some(timer) = self.slot.as_mut() else {
            return 0;
        };
        if now < timer.next_due {
            return 0;
        }

        let overdue = (now - timer.next_due).as_nanos() / timer.interval.as_nanos();
        let fired = u32::try_from(overdue).unwrap_or(u32::MAX - 1) + 1;
        timer.next_due += timer.interval.saturating_mul(fired);
        fired
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(timer) = self.slot.take() {
            log::debug!("Ticker: {} cancelled on teardown", timer.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[test]
    fn test_idle_ticker_never_fires() {
        let mut ticker = Ticker::new();
        assert!(!ticker.is_active());
        assert_eq!(ticker.poll(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_fires_once_per_interval() {
        let mut ticker = Ticker::new();
        ticker.start(Duration::ZERO, INTERVAL);

        assert_eq!(ticker.poll(Duration::from_millis(99)), 0);
        assert_eq!(ticker.poll(Duration::from_millis(100)), 1);
        assert_eq!(ticker.poll(Duration::from_millis(150)), 0);
        assert_eq!(ticker.poll(Duration::from_millis(200)), 1);
    }

    #[test]
    fn test_late_poll_catches_up() {
        let mut ticker = Ticker::new();
        ticker.start(Duration::ZERO, INTERVAL);

        assert_eq!(ticker.poll(Duration::from_millis(1050)), 10);
        assert_eq!(ticker.poll(Duration::from_millis(1100)), 1);
    }

    #[test]
    fn test_restart_replaces_previous_timer() {
        let mut ticker = Ticker::new();
        let first = ticker.start(Duration::ZERO, INTERVAL);
        let second = ticker.start(Duration::ZERO, INTERVAL);

        assert_ne!(first, second);
        assert_eq!(ticker.active_id(), Some(second));
        // One slot: one second of wall time is ten ticks, not twenty.
        assert_eq!(ticker.poll(Duration::from_secs(1)), 10);
    }

    #[test]
    fn test_cancel() {
        let mut ticker = Ticker::new();
        ticker.start(Duration::ZERO, INTERVAL);
        assert!(ticker.cancel());
        assert!(!ticker.cancel());
        assert_eq!(ticker.poll(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut ticker = Ticker::new();
        ticker.start(Duration::ZERO, Duration::ZERO);
        assert_eq!(ticker.interval(), Some(MIN_INTERVAL));
    }
}
