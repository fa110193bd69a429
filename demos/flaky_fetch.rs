//! Flaky Fetch Example
//!
//! Wraps a simulated remote fetch in a retry controller, the way an HTTP
//! client would wrap its request function. Shows:
//! - Fetching with the default controller
//! - Observing each backoff through a hook
//! - Many clients retrying against one recovering service
//! - Cancelling a retry loop on shutdown
//!
//! Run with: cargo run --example flaky_fetch --features tracing

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jitteroff::prelude::*;

// ==================== Simulated Service ====================

#[derive(Debug, Clone, PartialEq)]
enum FetchError {
    ConnectionReset,
    Unavailable(u16),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::ConnectionReset => write!(f, "connection reset by peer"),
            FetchError::Unavailable(status) => write!(f, "service unavailable ({})", status),
        }
    }
}

impl std::error::Error for FetchError {}

/// A service that rejects its first `outage` requests.
#[derive(Clone)]
struct FlakyService {
    outage: u32,
    hits: Arc<AtomicU32>,
}

impl FlakyService {
    fn new(outage: u32) -> Self {
        Self {
            outage,
            hits: Arc::new(AtomicU32::new(0)),
        }
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let n = self.hits.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        match n {
            n if n < self.outage && n % 2 == 0 => Err(FetchError::ConnectionReset),
            n if n < self.outage => Err(FetchError::Unavailable(503)),
            _ => Ok(format!("contents of {}", path).into_bytes()),
        }
    }
}

/// Fetch `path`, retrying transport failures with the default policy.
async fn get(service: &FlakyService, path: &str) -> Result<Vec<u8>, FetchError> {
    let mut controller = RetryController::default();
    controller.execute_async(|| service.get(path)).await
}

// ==================== Basic Fetch ====================

/// Example 1: One failure, then the default controller recovers.
async fn example_basic_fetch() {
    println!("\n=== Example 1: Basic Fetch ===");

    let service = FlakyService::new(1);
    match get(&service, "/index.html").await {
        Ok(body) => println!("Fetched: {}", String::from_utf8_lossy(&body)),
        Err(e) => println!("Fetch failed: {}", e),
    }

    // Two failures exhaust the default budget of two attempts.
    let service = FlakyService::new(2);
    match get(&service, "/index.html").await {
        Ok(body) => println!("Fetched: {}", String::from_utf8_lossy(&body)),
        Err(e) => println!("Fetch failed after default budget: {}", e),
    }
}

// ==================== Hooks ====================

/// Example 2: Watching every backoff decision.
fn example_hooks() {
    println!("\n=== Example 2: Retry Hooks ===");

    let config = match RetryConfig::new(5, Duration::from_millis(20), Duration::from_millis(200)) {
        Ok(config) => config,
        Err(e) => {
            println!("Invalid config: {}", e);
            return;
        }
    };
    let mut controller = RetryController::new(config);
    let mut calls = 0;

    let result = controller.execute_with_hooks(
        || {
            calls += 1;
            if calls < 4 {
                Err(FetchError::Unavailable(503))
            } else {
                Ok("payload")
            }
        },
        |event: &RetryEvent<'_, FetchError>| {
            println!("  [HOOK] Attempt {} failed: {}", event.attempt, event.error);
            match event.next_delay {
                Some(delay) => println!("         Waiting {:?}", delay),
                None => println!("         Giving up"),
            }
        },
    );

    println!("Result: {:?} after {} failures", result, controller.attempts());
}

// ==================== Thundering Herd ====================

/// Example 3: Many clients hitting one service that just went down.
///
/// With jitter the clients' retries land spread across the backoff window
/// instead of all at once.
async fn example_thundering_herd() {
    println!("\n=== Example 3: Thundering Herd ===");

    let config = match RetryConfig::new(3, Duration::from_millis(50), Duration::from_millis(400)) {
        Ok(config) => config,
        Err(e) => {
            println!("Invalid config: {}", e);
            return;
        }
    };
    let service = FlakyService::new(20);
    let start = Instant::now();

    let handles: Vec<_> = (0..10)
        .map(|client| {
            let service = service.clone();
            tokio::spawn(async move {
                let mut controller = RetryController::new(config);
                let result = controller.execute_async(|| service.get("/status")).await;
                (client, result.is_ok(), controller.last_backoff())
            })
        })
        .collect();

    for handle in handles {
        match handle.await {
            Ok((client, ok, backoff)) => {
                println!("  client {:2}: ok={} last backoff {:?}", client, ok, backoff)
            }
            Err(e) => println!("  client task failed: {}", e),
        }
    }
    println!("All clients finished in {:?}", start.elapsed());
}

// ==================== Cancellation ====================

/// Example 4: Abandoning a retry loop when the process shuts down.
async fn example_cancellation() {
    println!("\n=== Example 4: Cancellation ===");

    let config = match RetryConfig::new(10, Duration::from_secs(1), Duration::from_secs(30)) {
        Ok(config) => config,
        Err(e) => {
            println!("Invalid config: {}", e);
            return;
        }
    };
    let mut controller = RetryController::new(config);
    let service = FlakyService::new(u32::MAX);
    let shutdown = tokio::time::sleep(Duration::from_millis(100));

    match controller
        .execute_until(|| service.get("/report"), shutdown)
        .await
    {
        Ok(_) => println!("Unexpected success"),
        Err(CancelError::Cancelled { attempts }) => {
            println!("Cancelled during backoff after {} failures", attempts)
        }
        Err(CancelError::Inner(e)) => println!("Exhausted: {}", e),
    }
    println!("Final state: {:?}", controller.state());
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    tracing::info!("Starting flaky fetch demo");

    example_basic_fetch().await;
    example_hooks();
    example_thundering_herd().await;
    example_cancellation().await;
}
