//! Unit tests for the Relay SDK
//!
//! This module contains tests for the components of the SDK that talk to
//! each other or to mock HTTP servers.


use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::resilience::Sleeper;

/// Sleeper that records requested delays instead of waiting
#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}
