//! Retry configuration types.

use std::time::Duration;

use super::error::ConfigError;

const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_CAP_DELAY: Duration = Duration::from_millis(400);

/// Configuration for a [`RetryController`](super::RetryController).
///
/// A config is pure data: it describes the attempt budget and the delay
/// curve, and computes capped delays, but never sleeps or calls anything.
///
/// # Attempt Counting
///
/// `max_attempts` counts *total* invocations of the operation, the first one
/// included. `max_attempts = 3` means one initial call plus at most two
/// retries.
///
/// # Examples
///
/// ```rust
/// use jitteroff::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default();
/// assert_eq!(config.max_attempts(), 2);
/// assert_eq!(config.base_delay(), Duration::from_millis(100));
/// assert_eq!(config.cap_delay(), Duration::from_millis(400));
///
/// let config = RetryConfig::new(5, Duration::from_millis(200), Duration::from_millis(800))
///     .unwrap();
/// assert_eq!(config.max_attempts(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryConfig {
    max_attempts: u32,
    base_delay: Duration,
    cap_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            cap_delay: DEFAULT_CAP_DELAY,
        }
    }
}

impl RetryConfig {
    /// Create a validated config.
    ///
    /// Rejects a zero attempt budget and a cap smaller than the base delay.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitteroff::{ConfigError, RetryConfig};
    /// use std::time::Duration;
    ///
    /// let err = RetryConfig::new(0, Duration::from_millis(10), Duration::from_millis(20));
    /// assert_eq!(err, Err(ConfigError::ZeroAttempts));
    ///
    /// let err = RetryConfig::new(3, Duration::from_millis(50), Duration::from_millis(20));
    /// assert!(matches!(err, Err(ConfigError::CapBelowBase { .. })));
    /// ```
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        cap_delay: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self::unchecked(max_attempts, base_delay, cap_delay);
        config.validate()?;
        Ok(config)
    }

    /// Create a config without validation.
    ///
    /// Degenerate values are accepted as-is: with `max_attempts = 0` the first
    /// failure ends the loop without any backoff, and a cap below the base
    /// delay clamps every delay to the cap.
    pub fn unchecked(max_attempts: u32, base_delay: Duration, cap_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            cap_delay,
        }
    }

    /// Set the total attempt budget.
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay unit.
    pub fn with_base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }

    /// Set the ceiling applied before jitter.
    pub fn with_cap_delay(mut self, d: Duration) -> Self {
        self.cap_delay = d;
        self
    }

    /// Check the config for degenerate values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.cap_delay < self.base_delay {
            return Err(ConfigError::CapBelowBase {
                base: self.base_delay,
                cap: self.cap_delay,
            });
        }
        Ok(())
    }

    /// Get the total attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the base delay unit.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Get the delay ceiling.
    pub fn cap_delay(&self) -> Duration {
        self.cap_delay
    }

    /// Calculate the capped delay after `attempt` failures (1-based).
    ///
    /// Delay = min(cap, base * 2^attempt), computed without overflow for any
    /// attempt number. Jitter is applied on top of this value by
    /// [`backoff`](super::backoff).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitteroff::RetryConfig;
    /// use std::time::Duration;
    ///
    /// let config = RetryConfig::default();
    ///
    /// assert_eq!(config.capped_delay(1), Duration::from_millis(200));
    /// assert_eq!(config.capped_delay(2), Duration::from_millis(400));
    /// assert_eq!(config.capped_delay(3), Duration::from_millis(400)); // capped
    /// ```
    pub fn capped_delay(&self, attempt: u32) -> Duration {
        let raw = 1u128
            .checked_shl(attempt)
            .and_then(|factor| self.base_delay.as_nanos().checked_mul(factor));

        match raw {
            Some(nanos) if nanos < self.cap_delay.as_nanos() => duration_from_nanos(nanos),
            _ if self.base_delay.is_zero() => Duration::ZERO,
            _ => self.cap_delay,
        }
    }
}

// Callers guarantee `nanos` is below some existing `Duration`.
fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}
