//! Bounded fixed-delay retry.

use std::thread;
use std::time::Duration;

use anyhow::Result;

/// Default number of attempts per install method.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Upper bound for a configured attempt count.
pub const MAX_ATTEMPTS: u32 = 3;

/// Default delay between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, including the first one. Never less than 1.
    pub attempts: u32,
    /// Sleep between consecutive tries (not after the last one).
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// `Ok` from the first successful try, or the error of the last one.
    pub result: Result<T>,
    /// How many times the operation actually ran.
    pub tries: u32,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. Sleeping is blocking.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let attempts = self.attempts.max(1);
        let mut tries = 0;
        loop {
            tries += 1;
            tracing::info!("{label}: attempt {tries}/{attempts}");
            match op(tries) {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        tries,
                    }
                }
                Err(e) if tries < attempts => {
                    tracing::warn!(
                        "{label}: attempt {tries}/{attempts} failed: {e:#}; retrying in {}s",
                        self.delay.as_secs_f64()
                    );
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                }
                Err(e) => {
                    tracing::warn!("{label}: attempt {tries}/{attempts} failed: {e:#}; giving up");
                    return RetryOutcome {
                        result: Err(e),
                        tries,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn instant(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(5));
    }

    #[test]
    fn test_stops_at_first_success() {
        let outcome = instant(3).run("op", |n| if n == 2 { Ok(n) } else { bail!("boom") });
        assert_eq!(outcome.tries, 2);
        assert_eq!(outcome.result.unwrap(), 2);
    }

    #[test]
    fn test_never_exceeds_budget() {
        let mut calls = 0;
        let outcome: RetryOutcome<()> = instant(3).run("op", |_| {
            calls += 1;
            bail!("always fails")
        });
        assert_eq!(calls, 3);
        assert_eq!(outcome.tries, 3);
        assert!(outcome.result.is_err());
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.attempts, 1);
        let outcome = policy.run("op", |_| Ok(()));
        assert_eq!(outcome.tries, 1);
    }

    #[test]
    fn test_last_error_is_reported() {
        let outcome: RetryOutcome<()> = instant(2).run("op", |n| bail!("failure {n}"));
        let err = outcome.result.unwrap_err();
        assert_eq!(err.to_string(), "failure 2");
    }
}
