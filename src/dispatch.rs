//! Deletion Dispatcher
//!
//! Fans a batch of document identifiers out as concurrent delete requests,
//! bounded to `concurrency` in flight at once. Each identifier gets exactly
//! one attempt per call; a failed delete is reported in the outcome map, not
//! retried. Completion order is not meaningful, so outcomes are collected
//! into a map keyed by identifier.

use crate::error::DeleteError;
use crate::index::{DocumentId, Scope, SearchIndex};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Result of one delete attempt.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The service accepted the delete; `status` echoes its receipt when the
    /// response carried one.
    Accepted { status: Option<String> },
    /// The attempt failed. Not retried within this run.
    Failed(DeleteError),
}

impl DeleteOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DeleteOutcome::Accepted { .. })
    }
}

/// Issue one delete request per identifier with at most `concurrency` in
/// flight, blocking until every attempt has completed. The caller is
/// responsible for skipping the call on an empty batch and for folding all
/// attempted identifiers into its dispatched set afterwards, whatever the
/// individual outcomes.
pub async fn dispatch_deletes(
    client: &dyn SearchIndex,
    scope: &Scope,
    identifiers: HashSet<DocumentId>,
    concurrency: usize,
) -> HashMap<DocumentId, DeleteOutcome> {
    debug_assert!(!identifiers.is_empty());
    debug_assert!(concurrency > 0);

    let batch_len = identifiers.len();
    let outcomes: HashMap<DocumentId, DeleteOutcome> = stream::iter(identifiers)
        .map(|document_id| async move {
            let outcome = match client.delete_document(scope, &document_id).await {
                Ok(receipt) => DeleteOutcome::Accepted {
                    status: receipt.status,
                },
                Err(e) => DeleteOutcome::Failed(e),
            };
            (document_id, outcome)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    debug!(
        batch = batch_len,
        accepted = outcomes.values().filter(|o| o.is_accepted()).count(),
        "Delete batch completed"
    );

    outcomes
}
