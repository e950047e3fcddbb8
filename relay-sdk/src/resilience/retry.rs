//! Retry with exponential backoff for recoverable errors
//!
//! The delay before retry `n` (0-based) is `initial_interval * multiplier^n`,
//! without jitter. With the default one second initial interval this is
//! `factor^n` seconds.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};

use crate::error::{RelayError, Result};

/// Default number of attempts, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff factor
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.6;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first (1 means no retries)
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_interval: Duration,

    /// Multiplier for backoff between retries
    pub multiplier: f64,

    /// Upper bound for a single delay
    pub max_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_interval: Duration::from_secs(1),
            multiplier: DEFAULT_BACKOFF_FACTOR,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Retry policy with `max_attempts` and backoff `factor^n` seconds
    pub fn with_factor(max_attempts: u32, factor: f64) -> Self {
        Self {
            max_attempts,
            multiplier: factor,
            ..Self::default()
        }
    }

    /// The delays that would be slept for a run exhausting every attempt
    pub fn schedule(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (1..self.max_attempts.max(1))
            .filter_map(|_| backoff.next_backoff())
            .collect()
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            multiplier: self.multiplier,
            randomization_factor: 0.0,
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryConfig {{ max_attempts: {}, initial_interval: {:?}, multiplier: {}, max_interval: {:?} }}",
            self.max_attempts, self.initial_interval, self.multiplier, self.max_interval
        )
    }
}

/// Something that can wait between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Executor for retry operations with exponential backoff
#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .finish()
    }
}

impl RetryExecutor {
    /// Create a new retry executor with the specified configuration
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Execute a fallible operation with retries according to the configuration
    ///
    /// The closure receives the 1-based attempt number. On final failure the
    /// error carries an `attempts` context value.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.config.backoff();
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(&err) && attempt < max_attempts => {
                    let Some(delay) = backoff.next_backoff() else {
                        return Err(err.with_context_value("attempts", attempt));
                    };

                    log::warn!(
                        "Operation failed with retryable error, retrying in {:?} (attempt {}/{}): {}",
                        delay,
                        attempt,
                        max_attempts,
                        err
                    );

                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.with_context_value("attempts", attempt)),
            }
        }
    }

    /// Determine if an error should be retried
    fn should_retry(&self, error: &RelayError) -> bool {
        error.is_retryable()
    }

    /// Get the current retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}
