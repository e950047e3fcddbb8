//! Submission tests
//!
//! `submitter_tests` drives the submitter against a scripted transport;
//! `delivery_tests` runs the real webhook client against mock servers.

mod submitter_tests;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use relay_sdk::webhook::DeliveryReceipt;
use relay_sdk::{RelayError, Sleeper, WebhookTransport};
use serde_json::Value;
use sheet_store::{MemorySource, SheetKey, SheetStore, Table};

/// Transport that answers from a script and records every call
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<relay_sdk::Result<DeliveryReceipt>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub(crate) fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn failing(error: RelayError) -> Arc<Self> {
        let transport = Self::default();
        transport.script.lock().unwrap().push_back(Err(error));
        Arc::new(transport)
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookTransport for ScriptedTransport {
    async fn deliver(&self, url: &str, body: &Value) -> relay_sdk::Result<DeliveryReceipt> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));

        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(DeliveryReceipt {
                status: 200,
                attempts: 1,
                body_excerpt: Some("accepted".to_string()),
                request_id: "test-request".to_string(),
            })
        })
    }
}

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

pub(crate) fn sheet_key() -> SheetKey {
    SheetKey::new("sheet-1", "Requests")
}

/// Store over a single in-memory table with `Request_ID, STATE, Authorize` columns
pub(crate) fn store_with_rows(rows: &[[&str; 3]]) -> Arc<SheetStore> {
    let mut all = vec![vec![
        "Request_ID".to_string(),
        "STATE".to_string(),
        "Authorize".to_string(),
    ]];
    all.extend(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect()),
    );

    let source = MemorySource::new().with_table(sheet_key(), Table::from_rows(all));
    Arc::new(SheetStore::new(
        Arc::new(source),
        sheet_key(),
        Duration::from_secs(30),
    ))
}
