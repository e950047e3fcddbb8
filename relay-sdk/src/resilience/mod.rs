//! Resilience patterns for service clients
//!
//! Bounded retry with exponential backoff. Delivery is fire-and-forget past
//! the retry bound; there is no persistent queue here.

mod retry;

pub use retry::{
    RetryConfig, RetryExecutor, Sleeper, TokioSleeper, DEFAULT_BACKOFF_FACTOR,
    DEFAULT_MAX_ATTEMPTS,
};
