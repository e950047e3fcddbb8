//! Reviewer lookup
//!
//! A lookup is user-initiated, so the cached table is dropped first and the
//! answer always reflects the current store contents.

use log::info;
use sheet_store::{RequestRecord, SheetStore};

use crate::error::SubmissionResult;
use crate::validation::InputError;

/// Fresh lookup of `id`; `Ok(None)` when the store has no such request
pub async fn lookup_request(
    store: &SheetStore,
    id: &str,
) -> SubmissionResult<Option<RequestRecord>> {
    let id = id.trim();
    if id.is_empty() {
        return Err(InputError::MissingIdentifier.into());
    }

    let record = store.lookup_fresh(id).await?;
    match &record {
        Some(r) => info!("Request {} is '{}'", r.id, r.state),
        None => info!("Request {} not found in {}", id, store.key()),
    }
    Ok(record)
}
