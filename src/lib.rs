//! # Jitteroff
//!
//! > *"Back off, but not in lockstep"*
//!
//! A retry controller for Rust: it runs an operation, and when the operation
//! fails it sleeps for an exponentially growing, capped and randomly jittered
//! delay before trying again, up to a fixed number of attempts.
//!
//! Jitter is what keeps a fleet of callers from hammering a recovering
//! service at the same instant (the thundering herd problem). Each controller
//! owns its own random generator, so independent controllers never share a
//! jitter sequence.
//!
//! ## Quick Example
//!
//! ```rust
//! use jitteroff::RetryController;
//!
//! // Defaults: 2 attempts, 100ms base delay, 400ms cap
//! let mut controller = RetryController::default();
//!
//! let mut calls = 0;
//! let result = controller.execute(|| {
//!     calls += 1;
//!     if calls == 1 {
//!         Err("connection reset")
//!     } else {
//!         Ok("payload")
//!     }
//! });
//!
//! assert_eq!(result, Ok("payload"));
//! assert_eq!(controller.attempts(), 1);
//! ```
//!
//! ## Features
//!
//! - `async` (default): `execute_async` and the cancellable `execute_until`
//! - `tracing`: debug events for backoff and exhaustion
//! - `serde`: `Serialize`/`Deserialize` for [`RetryConfig`]
//! - `proptest`: `Arbitrary` for [`RetryConfig`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod retry;
pub mod testing;

// Re-exports
pub use retry::{CancelError, ConfigError, RetryConfig, RetryController, RetryEvent, RetryState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::retry::{
        CancelError, ConfigError, RetryConfig, RetryController, RetryEvent, RetryState,
    };
}
