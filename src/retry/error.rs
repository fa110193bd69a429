//! Error types for retry configuration and cancellation.
//!
//! Operation failures are never wrapped on the plain execution paths; these
//! types only cover errors the controller itself can produce.

use std::time::Duration;

/// Error returned when a [`RetryConfig`](super::RetryConfig) is degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The attempt budget is zero, so the operation could never be retried.
    ZeroAttempts,
    /// The delay ceiling is smaller than the base delay.
    CapBelowBase {
        /// The configured base delay.
        base: Duration,
        /// The configured ceiling.
        cap: Duration,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroAttempts => write!(f, "max attempts must be at least 1"),
            Self::CapBelowBase { base, cap } => write!(
                f,
                "cap delay ({:?}) must not be smaller than base delay ({:?})",
                cap, base
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned by a cancellable retry loop.
///
/// Either the loop was cancelled before reaching a terminal state, or the
/// operation's own error surfaced on exhaustion.
///
/// # Examples
///
/// ```rust
/// use jitteroff::{RetryController, CancelError};
///
/// # tokio_test::block_on(async {
/// let mut controller = RetryController::default();
///
/// // Cancel signal that is already complete: nothing runs.
/// let result = controller
///     .execute_until(|| async { Ok::<_, String>(42) }, std::future::ready(()))
///     .await;
///
/// assert_eq!(result, Err(CancelError::Cancelled { attempts: 0 }));
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelError<E> {
    /// The cancel signal fired before the loop finished.
    Cancelled {
        /// Failed attempts observed before cancellation.
        attempts: u32,
    },
    /// The operation's error after the attempt budget ran out.
    Inner(E),
}

impl<E> CancelError<E> {
    /// Create a cancellation error.
    pub fn cancelled(attempts: u32) -> Self {
        Self::Cancelled { attempts }
    }

    /// Create an inner error.
    pub fn inner(error: E) -> Self {
        Self::Inner(error)
    }

    /// Returns true if the loop was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true if this wraps an operation error.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Get the operation error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Cancelled { .. } => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for CancelError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled { attempts } => {
                write!(f, "retry cancelled after {} failed attempts", attempts)
            }
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CancelError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cancelled { .. } => None,
            Self::Inner(e) => Some(e),
        }
    }
}
