//! Integration tests for the attempt loop.

use super::*;
use crate::assert_backoff_within;
use crate::testing::ScriptedOp;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

fn fast_config(max_attempts: u32) -> RetryConfig {
    RetryConfig::new(max_attempts, Duration::from_millis(1), Duration::from_millis(4)).unwrap()
}

#[test]
fn test_default_success_returns_immediately() {
    let mut controller = RetryController::default();
    let op = ScriptedOp::<_, String>::succeeding("body");

    let started = Instant::now();
    let result = controller.execute(|| op.call());

    assert_eq!(result, Ok("body"));
    assert_eq!(controller.attempts(), 0);
    assert_eq!(controller.last_backoff(), Duration::ZERO);
    assert_eq!(controller.state(), RetryState::Succeeded);
    assert_eq!(op.calls(), 1);
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_default_slow_success_is_not_retried() {
    let mut controller = RetryController::default();

    let result = controller.execute(|| {
        std::thread::sleep(Duration::from_millis(95));
        Ok::<_, String>(())
    });

    assert!(result.is_ok());
    assert_eq!(controller.attempts(), 0);
}

#[test]
fn test_default_always_failing() {
    let mut controller = RetryController::default();
    let op = ScriptedOp::<(), _>::always_failing("failed call");

    let result = controller.execute(|| op.call());

    assert_eq!(result, Err("failed call"));
    assert_eq!(controller.attempts(), 2);
    assert_eq!(op.calls(), 2);
    assert_eq!(controller.state(), RetryState::Exhausted);
    // One backoff after the first failure: capped at 200ms, jittered into [100ms, 200ms).
    assert!(controller.last_backoff() >= Duration::from_millis(100));
    assert!(controller.last_backoff() < Duration::from_millis(200));
}

#[test]
fn test_custom_always_failing() {
    let config =
        RetryConfig::new(5, Duration::from_millis(200), Duration::from_millis(800)).unwrap();
    let mut controller = RetryController::new(config);
    let op = ScriptedOp::<(), _>::always_failing("failed call");

    let result = controller.execute(|| op.call());

    assert!(result.is_err());
    assert_eq!(controller.attempts(), 5);
    assert_eq!(op.calls(), 5);
    assert!(controller.last_backoff() >= Duration::from_millis(200));
    assert!(controller.last_backoff() <= Duration::from_millis(800));
    assert_backoff_within!(controller.last_backoff(), config, 4);
}

#[test]
fn test_returns_error_from_final_attempt() {
    let mut controller = RetryController::new(fast_config(4));
    let mut calls = 0;

    let result: Result<(), _> = controller.execute(|| {
        calls += 1;
        Err(format!("attempt {}", calls))
    });

    assert_eq!(result, Err("attempt 4".to_string()));
}

#[test]
fn test_succeeds_after_transient_failures() {
    let mut controller = RetryController::new(fast_config(5));
    let op = ScriptedOp::new(3, 99, "transient");
    let mut sleeps = 0;

    let result = controller.execute_with_hooks(
        || op.call(),
        |event: &RetryEvent<'_, &str>| {
            if event.next_delay.is_some() {
                sleeps += 1;
            }
        },
    );

    assert_eq!(result, Ok(99));
    assert_eq!(controller.attempts(), 3);
    assert_eq!(op.calls(), 4);
    assert_eq!(sleeps, 3);
    assert_eq!(controller.state(), RetryState::Succeeded);
}

#[test]
fn test_hook_sees_each_failure_in_order() {
    let mut controller = RetryController::new(fast_config(3));
    let mut events = Vec::new();

    let _ = controller.execute_with_hooks(
        || Err::<(), _>("down"),
        |event: &RetryEvent<'_, &str>| {
            events.push((event.attempt, *event.error, event.next_delay));
        },
    );

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].0, 1);
    assert_eq!(events[1].0, 2);
    assert_eq!(events[2].0, 3);
    assert!(events.iter().all(|(_, e, _)| *e == "down"));
    assert!(events[0].2.is_some());
    assert!(events[1].2.is_some());
    assert_eq!(events[2].2, None);
}

#[test]
fn test_hook_delays_match_jitter_range() {
    let config =
        RetryConfig::new(6, Duration::from_micros(100), Duration::from_millis(2)).unwrap();
    let mut controller = RetryController::new(config);
    let mut delays = Vec::new();

    let _ = controller.execute_with_hooks(
        || Err::<(), _>(()),
        |event: &RetryEvent<'_, ()>| {
            if let Some(d) = event.next_delay {
                delays.push((event.attempt, d));
            }
        },
    );

    assert_eq!(delays.len(), 5);
    for (attempt, delay) in delays {
        assert_backoff_within!(delay, config, attempt);
        assert!(delay <= config.cap_delay());
    }
}

#[test]
fn test_hook_elapsed_grows() {
    let mut controller = RetryController::new(fast_config(3));
    let mut elapsed = Vec::new();

    let _ = controller.execute_with_hooks(
        || Err::<(), _>(()),
        |event: &RetryEvent<'_, ()>| elapsed.push(event.elapsed),
    );

    assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_single_attempt_budget_never_sleeps() {
    let config = RetryConfig::new(1, Duration::from_secs(10), Duration::from_secs(10)).unwrap();
    let mut controller = RetryController::new(config);

    let started = Instant::now();
    let result: Result<(), _> = controller.execute(|| Err("once"));

    assert_eq!(result, Err("once"));
    assert_eq!(controller.attempts(), 1);
    assert_eq!(controller.last_backoff(), Duration::ZERO);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_unchecked_zero_budget_exhausts_on_first_failure() {
    let config = RetryConfig::unchecked(0, Duration::from_secs(10), Duration::from_secs(10));
    let mut controller = RetryController::new(config);
    let op = ScriptedOp::<(), _>::always_failing("down");

    let result = controller.execute(|| op.call());

    assert_eq!(result, Err("down"));
    assert_eq!(op.calls(), 1);
    assert_eq!(controller.last_backoff(), Duration::ZERO);
    assert_eq!(controller.state(), RetryState::Exhausted);
}

#[test]
fn test_unchecked_zero_budget_still_returns_success() {
    let config = RetryConfig::unchecked(0, Duration::from_millis(1), Duration::from_millis(1));
    let mut controller = RetryController::new(config);

    assert_eq!(controller.execute(|| Ok::<_, ()>(1)), Ok(1));
}

#[test]
fn test_unchecked_cap_below_base_clamps_backoff() {
    let config = RetryConfig::unchecked(2, Duration::from_millis(50), Duration::from_millis(4));
    let mut controller = RetryController::new(config);

    let _ = controller.execute(|| Err::<(), _>(()));

    assert!(controller.last_backoff() >= Duration::from_millis(2));
    assert!(controller.last_backoff() < Duration::from_millis(4));
}

#[test]
fn test_reuse_after_success_keeps_zero_count() {
    let mut controller = RetryController::new(fast_config(3));

    assert_eq!(controller.execute(|| Ok::<_, ()>(1)), Ok(1));
    assert_eq!(controller.execute(|| Ok::<_, ()>(2)), Ok(2));
    assert_eq!(controller.attempts(), 0);
}

#[test]
fn test_reuse_carries_attempt_budget() {
    let mut controller = RetryController::new(fast_config(3));

    let first = ScriptedOp::new(2, "a", "e");
    assert_eq!(controller.execute(|| first.call()), Ok("a"));
    assert_eq!(controller.attempts(), 2);

    // Only one attempt left in the cumulative budget.
    let second = ScriptedOp::new(1, "b", "e");
    assert_eq!(controller.execute(|| second.call()), Err("e"));
    assert_eq!(second.calls(), 1);
    assert_eq!(controller.attempts(), 3);

    // A spent budget fails fast and never exceeds the limit.
    let third = ScriptedOp::<(), _>::always_failing("e");
    assert_eq!(controller.execute(|| third.call()), Err("e"));
    assert_eq!(third.calls(), 1);
    assert_eq!(controller.attempts(), 3);
}

#[test]
fn test_identical_configs_have_identical_trajectories() {
    let config = fast_config(4);
    let mut a = RetryController::with_rng(config, StdRng::seed_from_u64(1));
    let mut b = RetryController::with_rng(config, StdRng::seed_from_u64(2));
    let mut trail_a = Vec::new();
    let mut trail_b = Vec::new();

    let op_a = ScriptedOp::new(2, (), ());
    let op_b = ScriptedOp::new(2, (), ());
    let _ = a.execute_with_hooks(
        || op_a.call(),
        |e: &RetryEvent<'_, ()>| trail_a.push((e.attempt, e.next_delay.is_some())),
    );
    let _ = b.execute_with_hooks(
        || op_b.call(),
        |e: &RetryEvent<'_, ()>| trail_b.push((e.attempt, e.next_delay.is_some())),
    );

    assert_eq!(trail_a, trail_b);
    assert_eq!(a.attempts(), b.attempts());
}

#[test]
fn test_seeded_controllers_draw_identical_delays() {
    let config = fast_config(4);
    let mut a = RetryController::with_rng(config, StdRng::seed_from_u64(9));
    let mut b = RetryController::with_rng(config, StdRng::seed_from_u64(9));

    let _ = a.execute(|| Err::<(), _>(()));
    let _ = b.execute(|| Err::<(), _>(()));

    assert_eq!(a.last_backoff(), b.last_backoff());
}

#[test]
fn test_error_passes_through_unmodified() {
    #[derive(Debug, PartialEq)]
    struct Opaque {
        code: u16,
    }

    let mut controller = RetryController::new(fast_config(2));
    let result: Result<(), _> = controller.execute(|| Err(Opaque { code: 503 }));

    assert_eq!(result, Err(Opaque { code: 503 }));
}
