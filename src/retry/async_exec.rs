//! Async attempt loops.
//!
//! Backoff suspends the task with `tokio::time::sleep` instead of blocking the
//! thread. [`RetryController::execute_until`] also accepts a cancel signal.

use std::future::Future;

use futures::future::{select, Either};
use futures::FutureExt;
use rand::Rng;

use super::controller::RetryController;
use super::error::CancelError;

impl<R: Rng> RetryController<R> {
    /// Run an async operation until it succeeds or the budget runs out.
    ///
    /// `op` is called once per attempt to build a fresh future.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitteroff::{RetryConfig, RetryController};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let config = RetryConfig::new(4, Duration::from_millis(1), Duration::from_millis(4)).unwrap();
    /// let mut controller = RetryController::new(config);
    ///
    /// let mut calls = 0;
    /// let result = controller
    ///     .execute_async(|| {
    ///         calls += 1;
    ///         let n = calls;
    ///         async move { if n < 3 { Err("busy") } else { Ok(n) } }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(result, Ok(3));
    /// assert_eq!(controller.attempts(), 2);
    /// # });
    /// ```
    pub async fn execute_async<T, E, F, Fut>(&mut self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        loop {
            self.begin_attempt();
            match op().await {
                Ok(value) => {
                    self.record_success();
                    return Ok(value);
                }
                Err(error) => match self.record_failure() {
                    Some(d) => tokio::time::sleep(d).await,
                    None => return Err(error),
                },
            }
        }
    }

    /// Run an async operation until it succeeds, the budget runs out, or
    /// `cancel` completes.
    ///
    /// The cancel signal is checked before every attempt and raced against
    /// every backoff sleep. An attempt that is already running is allowed to
    /// finish; pass a deadline into the operation itself to bound it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitteroff::{CancelError, RetryConfig, RetryController, RetryState};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let config = RetryConfig::new(10, Duration::from_secs(5), Duration::from_secs(60)).unwrap();
    /// let mut controller = RetryController::new(config);
    ///
    /// let result = controller
    ///     .execute_until(
    ///         || async { Err::<(), _>("down") },
    ///         tokio::time::sleep(Duration::from_millis(20)),
    ///     )
    ///     .await;
    ///
    /// assert_eq!(result, Err(CancelError::Cancelled { attempts: 1 }));
    /// assert_eq!(controller.state(), RetryState::Cancelled);
    /// # });
    /// ```
    pub async fn execute_until<T, E, F, Fut, C>(
        &mut self,
        mut op: F,
        cancel: C,
    ) -> Result<T, CancelError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Future<Output = ()>,
    {
        futures::pin_mut!(cancel);

        loop {
            if cancel.as_mut().now_or_never().is_some() {
                self.mark_cancelled();
                return Err(CancelError::cancelled(self.attempts()));
            }

            self.begin_attempt();
            match op().await {
                Ok(value) => {
                    self.record_success();
                    return Ok(value);
                }
                Err(error) => {
                    let Some(d) = self.record_failure() else {
                        return Err(CancelError::inner(error));
                    };

                    let sleep = tokio::time::sleep(d);
                    futures::pin_mut!(sleep);

                    if let Either::Right(_) = select(sleep, cancel.as_mut()).await {
                        self.mark_cancelled();
                        return Err(CancelError::cancelled(self.attempts()));
                    }
                }
            }
        }
    }
}
