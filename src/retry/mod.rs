//! Retry with exponential backoff and jitter.
//!
//! The module is split the same way the loop is reasoned about:
//!
//! - **Config**: [`RetryConfig`] is plain data (attempt budget, base delay,
//!   cap) and computes capped delays
//! - **Backoff**: [`backoff`] turns a capped delay into a jittered one
//! - **Controller**: [`RetryController`] drives the attempt loop and records
//!   its progress
//!
//! # Quick Start
//!
//! ```rust
//! use jitteroff::{RetryConfig, RetryController};
//! use std::time::Duration;
//!
//! let config = RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(4)).unwrap();
//! let mut controller = RetryController::new(config);
//!
//! let value = controller.execute(|| Ok::<_, String>(42));
//! assert_eq!(value, Ok(42));
//! ```
//!
//! # Backoff Curve
//!
//! After the `n`-th failure the controller sleeps for a delay drawn uniformly
//! from `[c / 2, c)` where `c = min(cap, base * 2^n)`. With the defaults
//! (base 100ms, cap 400ms):
//!
//! | failure | capped | sleep range    |
//! |---------|--------|----------------|
//! | 1       | 200ms  | [100ms, 200ms) |
//! | 2       | 400ms  | [200ms, 400ms) |
//! | 3+      | 400ms  | [200ms, 400ms) |
//!
//! # Errors
//!
//! Operation errors pass through unchanged. The crate's own error types are:
//!
//! - [`ConfigError`]: Returned by [`RetryConfig::new`] for degenerate values
//! - [`CancelError`]: Returned by the cancellable async loop

pub mod backoff;
mod config;
mod controller;
mod error;

#[cfg(feature = "async")]
mod async_exec;

pub use config::RetryConfig;
pub use controller::{RetryController, RetryEvent, RetryState};
pub use error::{CancelError, ConfigError};

#[cfg(test)]
mod tests;
