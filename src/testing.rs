//! Testing utilities for code that retries through Jitteroff
//!
//! This module provides scripted operations with invocation counters, an
//! assertion macro for backoff ranges, and property-based testing support.
//!
//! # Examples
//!
//! ## ScriptedOp
//!
//! ```rust
//! use jitteroff::testing::ScriptedOp;
//! use jitteroff::{RetryConfig, RetryController};
//! use std::time::Duration;
//!
//! let op = ScriptedOp::new(2, "ok", "unavailable");
//! let config = RetryConfig::new(5, Duration::from_millis(1), Duration::from_millis(2)).unwrap();
//! let mut controller = RetryController::new(config);
//!
//! assert_eq!(controller.execute(|| op.call()), Ok("ok"));
//! assert_eq!(op.calls(), 3);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use jitteroff::{RetryConfig, assert_backoff_within};
//! use std::time::Duration;
//!
//! let config = RetryConfig::default();
//! assert_backoff_within!(Duration::from_millis(150), config, 1);
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// An operation that fails a fixed number of times, then succeeds.
///
/// Clones share the same invocation counter, so a clone can be moved into a
/// closure while the original is kept for assertions.
///
/// # Example
///
/// ```rust
/// use jitteroff::testing::ScriptedOp;
///
/// let op = ScriptedOp::new(1, 10, "nope");
/// assert_eq!(op.call(), Err("nope"));
/// assert_eq!(op.call(), Ok(10));
/// assert_eq!(op.call(), Ok(10));
/// assert_eq!(op.calls(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedOp<T, E> {
    failures: u32,
    value: T,
    error: E,
    calls: Arc<AtomicU32>,
}

impl<T: Clone, E: Clone> ScriptedOp<T, E> {
    /// Fail the first `failures` calls with `error`, then return `value`.
    pub fn new(failures: u32, value: T, error: E) -> Self {
        Self {
            failures,
            value,
            error,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Invoke the operation once.
    pub fn call(&self) -> Result<T, E> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(self.error.clone())
        } else {
            Ok(self.value.clone())
        }
    }

    /// Invoke the operation once, as an already-completed future.
    pub fn call_async(&self) -> impl Future<Output = Result<T, E>> {
        std::future::ready(self.call())
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Default, E: Clone> ScriptedOp<T, E> {
    /// An operation that never succeeds.
    pub fn always_failing(error: E) -> Self {
        Self::new(u32::MAX, T::default(), error)
    }
}

impl<T: Clone, E: Clone + Default> ScriptedOp<T, E> {
    /// An operation that succeeds on the first call.
    pub fn succeeding(value: T) -> Self {
        Self::new(0, value, E::default())
    }
}

/// Assert that a delay lies in the jitter range for `attempt` failures.
///
/// The range is `[c / 2, c)` with `c = config.capped_delay(attempt)`, or
/// exactly zero when `c` is zero.
///
/// # Example
///
/// ```rust
/// use jitteroff::{RetryConfig, assert_backoff_within};
/// use std::time::Duration;
///
/// let config = RetryConfig::default();
/// assert_backoff_within!(Duration::from_millis(250), config, 2);
/// ```
#[macro_export]
macro_rules! assert_backoff_within {
    ($delay:expr, $config:expr, $attempt:expr) => {{
        let delay: ::std::time::Duration = $delay;
        let capped = $crate::RetryConfig::capped_delay(&$config, $attempt);
        if capped.is_zero() {
            assert!(
                delay.is_zero(),
                "Expected zero backoff for attempt {}, got {:?}",
                $attempt,
                delay
            );
        } else {
            let low = capped / 2;
            assert!(
                delay >= low && delay < capped,
                "Expected backoff in [{:?}, {:?}) for attempt {}, got {:?}",
                low,
                capped,
                $attempt,
                delay
            );
        }
    }};
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

/// Generates valid configs with sub-millisecond delays so that looping
/// properties stay fast.
#[cfg(feature = "proptest")]
impl Arbitrary for crate::RetryConfig {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (1u32..=6, 0u64..=200, 0u64..=800)
            .prop_map(|(max_attempts, base, extra)| {
                crate::RetryConfig::unchecked(
                    max_attempts,
                    std::time::Duration::from_micros(base),
                    std::time::Duration::from_micros(base + extra),
                )
            })
            .boxed()
    }
}
