// ==========================================
// Inventory Count Automation - bounded retry policy
// ==========================================
// Every wait in the state machines goes through a Clock so tests can
// replace real time with a manual clock that advances on sleep.
// ==========================================

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ==========================================
// Clock
// ==========================================
#[async_trait]
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock was created.
    fn elapsed(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

#[async_trait]
impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: `sleep` returns immediately and advances the elapsed time.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

// ==========================================
// Deadline
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    end: Duration,
}

impl Deadline {
    pub fn after(clock: &dyn Clock, timeout: Duration) -> Self {
        Self {
            end: clock.elapsed() + timeout,
        }
    }

    pub fn expired(&self, clock: &dyn Clock) -> bool {
        clock.elapsed() >= self.end
    }
}

// ==========================================
// RetryPolicy
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// 1-based attempt numbers.
    pub fn attempts(&self) -> impl Iterator<Item = u32> {
        1..=self.max_attempts
    }

    pub fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    /// Pause between attempts.
    pub async fn backoff(&self, clock: &dyn Clock) {
        clock.sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_advances_on_sleep() {
        let clock = ManualClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        clock.sleep(Duration::from_millis(250)).await;
        clock.sleep(Duration::from_millis(250)).await;
        assert_eq!(clock.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_deadline_expires_with_virtual_time() {
        let clock = ManualClock::new();
        let deadline = Deadline::after(&clock, Duration::from_secs(1));
        assert!(!deadline.expired(&clock));
        clock.sleep(Duration::from_millis(999)).await;
        assert!(!deadline.expired(&clock));
        clock.sleep(Duration::from_millis(1)).await;
        assert!(deadline.expired(&clock));
    }

    #[test]
    fn test_policy_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        assert_eq!(policy.attempts().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(policy.is_last(3));
        assert!(!policy.is_last(2));

        let at_least_once = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(at_least_once.attempts().count(), 1);
    }
}
