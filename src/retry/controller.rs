//! The retry controller and its attempt loop.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::backoff;
use super::config::RetryConfig;

/// Where a controller is in its attempt loop.
///
/// `Succeeded`, `Exhausted` and `Cancelled` are terminal for a single call;
/// a reused controller moves back to `Attempting` on its next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RetryState {
    /// No attempt has been made yet.
    #[default]
    Idle,
    /// The operation is running.
    Attempting,
    /// Sleeping between a failure and the next attempt.
    BackingOff,
    /// The last call returned the operation's success value.
    Succeeded,
    /// The last call ran out of attempts.
    Exhausted,
    /// The last call was cancelled before finishing.
    Cancelled,
}

impl RetryState {
    /// Returns true for states that end a call.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted | Self::Cancelled)
    }
}

/// Information about a failed attempt, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Failures observed so far, including this one (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, or `None` when the budget is spent.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the call began.
    pub elapsed: Duration,
}

/// Runs an operation, retrying failures with jittered exponential backoff.
///
/// A controller owns one attempt sequence. Its counters are plain fields
/// mutated through `&mut self`, so one instance cannot be driven from two
/// places at once; create one controller per logical call. Reusing an
/// instance carries the attempt count over, which gives a cumulative budget.
///
/// Every controller owns its own random generator, seeded from the operating
/// system unless one is supplied with [`RetryController::with_rng`].
///
/// # Examples
///
/// ```rust
/// use jitteroff::{RetryConfig, RetryController};
/// use std::time::Duration;
///
/// let config = RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(4)).unwrap();
/// let mut controller = RetryController::new(config);
///
/// let mut calls = 0;
/// let result = controller.execute(|| {
///     calls += 1;
///     if calls < 2 { Err("busy") } else { Ok(calls) }
/// });
///
/// assert_eq!(result, Ok(2));
/// assert_eq!(controller.attempts(), 1);
/// ```
pub struct RetryController<R = StdRng> {
    config: RetryConfig,
    attempts: u32,
    last_backoff: Duration,
    state: RetryState,
    rng: R,
}

impl<R> std::fmt::Debug for RetryController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryController")
            .field("config", &self.config)
            .field("attempts", &self.attempts)
            .field("last_backoff", &self.last_backoff)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RetryController<StdRng> {
    /// Create a controller with an OS-seeded random generator.
    pub fn new(config: RetryConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl Default for RetryController<StdRng> {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl<R: Rng> RetryController<R> {
    /// Create a controller that draws jitter from `rng`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitteroff::{RetryConfig, RetryController};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let controller = RetryController::with_rng(RetryConfig::default(), StdRng::seed_from_u64(1));
    /// assert_eq!(controller.attempts(), 0);
    /// ```
    pub fn with_rng(config: RetryConfig, rng: R) -> Self {
        Self {
            config,
            attempts: 0,
            last_backoff: Duration::ZERO,
            state: RetryState::Idle,
            rng,
        }
    }

    /// Failures observed so far. Never exceeds [`max_attempts`](Self::max_attempts).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Get the total attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts()
    }

    /// The most recent jittered delay, or zero if no backoff happened yet.
    pub fn last_backoff(&self) -> Duration {
        self.last_backoff
    }

    /// The last state the loop reached.
    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Get the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `op` until it succeeds or the attempt budget runs out.
    ///
    /// Blocks the calling thread during backoff. On exhaustion the error of
    /// the final attempt is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitteroff::{RetryConfig, RetryController, RetryState};
    /// use std::time::Duration;
    ///
    /// let config = RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(2)).unwrap();
    /// let mut controller = RetryController::new(config);
    ///
    /// let result: Result<(), _> = controller.execute(|| Err("down"));
    ///
    /// assert_eq!(result, Err("down"));
    /// assert_eq!(controller.attempts(), 3);
    /// assert_eq!(controller.state(), RetryState::Exhausted);
    /// ```
    pub fn execute<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.execute_with_hooks(op, |_| {})
    }

    /// Run `op` like [`execute`](Self::execute), calling `on_retry` after
    /// every failed attempt.
    ///
    /// The hook sees the failure before the controller sleeps and should not
    /// block; use it for logging or metrics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitteroff::{RetryConfig, RetryController, RetryEvent};
    /// use std::time::Duration;
    ///
    /// let config = RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(2)).unwrap();
    /// let mut controller = RetryController::new(config);
    /// let mut seen = Vec::new();
    ///
    /// let _ = controller.execute_with_hooks(
    ///     || Err::<(), _>("down"),
    ///     |event: &RetryEvent<'_, &str>| seen.push((event.attempt, event.next_delay.is_some())),
    /// );
    ///
    /// assert_eq!(seen, vec![(1, true), (2, true), (3, false)]);
    /// ```
    pub fn execute_with_hooks<T, E, F, H>(&mut self, mut op: F, mut on_retry: H) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        H: FnMut(&RetryEvent<'_, E>),
    {
        let start = Instant::now();

        loop {
            self.begin_attempt();
            match op() {
                Ok(value) => {
                    self.record_success();
                    return Ok(value);
                }
                Err(error) => {
                    let delay = self.record_failure();

                    on_retry(&RetryEvent {
                        attempt: self.attempts,
                        error: &error,
                        next_delay: delay,
                        elapsed: start.elapsed(),
                    });

                    match delay {
                        Some(d) => std::thread::sleep(d),
                        None => return Err(error),
                    }
                }
            }
        }
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.state = RetryState::Attempting;
    }

    pub(crate) fn record_success(&mut self) {
        self.state = RetryState::Succeeded;

        #[cfg(feature = "tracing")]
        tracing::trace!(failures = self.attempts, "operation succeeded");
    }

    /// Count a failure and pick the next delay, or `None` once exhausted.
    pub(crate) fn record_failure(&mut self) -> Option<Duration> {
        let max = self.config.max_attempts();
        self.attempts = self.attempts.saturating_add(1).min(max);

        if self.attempts >= max {
            self.state = RetryState::Exhausted;

            #[cfg(feature = "tracing")]
            tracing::debug!(attempts = self.attempts, "retry attempts exhausted");

            return None;
        }

        let delay = backoff::delay_for_attempt(&self.config, self.attempts, &mut self.rng);
        self.last_backoff = delay;
        self.state = RetryState::BackingOff;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt = self.attempts,
            max_attempts = max,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, backing off"
        );

        Some(delay)
    }

    #[cfg_attr(not(feature = "async"), allow(dead_code))]
    pub(crate) fn mark_cancelled(&mut self) {
        self.state = RetryState::Cancelled;

        #[cfg(feature = "tracing")]
        tracing::debug!(attempts = self.attempts, "retry loop cancelled");
    }
}
