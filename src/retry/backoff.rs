//! Backoff delay computation.
//!
//! The delay after the `n`-th failure is drawn uniformly from
//! `[capped / 2, capped)` where `capped = min(cap, base * 2^n)`. Keeping the
//! lower half of the range guarantees real backoff while the random upper half
//! spreads callers that share a config, so they do not retry in lockstep.

use std::time::Duration;

use rand::Rng;

use super::config::RetryConfig;

/// Map a fraction `r` in `[0, 1)` onto `[capped / 2, capped)`.
///
/// Returns [`Duration::ZERO`] when `capped` is zero. Values of `r` outside
/// `[0, 1)` are clamped into the range.
///
/// # Examples
///
/// ```rust
/// use jitteroff::retry::backoff::jittered;
/// use std::time::Duration;
///
/// let capped = Duration::from_millis(200);
///
/// assert_eq!(jittered(capped, 0.0), Duration::from_millis(100));
/// assert_eq!(jittered(capped, 0.5), Duration::from_millis(150));
/// assert!(jittered(capped, 0.999_999_999) < capped);
/// ```
pub fn jittered(capped: Duration, r: f64) -> Duration {
    let total = u64::try_from(capped.as_nanos()).unwrap_or(u64::MAX);
    let half = total / 2;
    let span = total - half;

    let r = if r.is_nan() { 0.0 } else { r.clamp(0.0, 1.0) };
    // `as` truncates toward zero; the clamp keeps the upper bound exclusive.
    let offset = ((span as f64) * r) as u64;
    let offset = offset.min(span.saturating_sub(1));

    Duration::from_nanos(half + offset)
}

/// Compute the jittered delay after `attempt` failures using `rng`.
///
/// # Examples
///
/// ```rust
/// use jitteroff::RetryConfig;
/// use jitteroff::retry::backoff::delay_for_attempt;
/// use std::time::Duration;
///
/// let config = RetryConfig::default();
/// let mut rng = rand::rng();
///
/// let delay = delay_for_attempt(&config, 1, &mut rng);
/// assert!(delay >= Duration::from_millis(100));
/// assert!(delay < Duration::from_millis(200));
/// ```
pub fn delay_for_attempt<R: Rng>(config: &RetryConfig, attempt: u32, rng: &mut R) -> Duration {
    let capped = config.capped_delay(attempt);
    let r: f64 = rng.random();
    jittered(capped, r)
}
