//! Convergence Controller
//!
//! Drives the poll/diff/dispatch/wait cycle until the remote index reports
//! empty. One task runs the loop sequentially; within a dispatch the delete
//! fan-out runs concurrently but the loop blocks until the whole batch has
//! resolved, so the dispatched set is only ever touched between iterations.
//!
//! Termination is decided by the index itself: the loop ends only when a poll
//! reports zero total matches, never merely because every visible identifier
//! has been dispatched — the poll window is a bounded partial view and the
//! index lags behind acknowledged deletes.

use crate::config::PurgeConfig;
use crate::dispatch::{dispatch_deletes, DeleteOutcome};
use crate::error::ScourError;
use crate::index::{DocumentId, Scope, SearchIndex};
use crate::progress::{PurgeEvent, PurgeObserver};
use crate::retry::retry_fixed;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info};

/// Final accounting for a run.
#[derive(Debug)]
pub struct PurgeSummary {
    /// Identifiers a delete request was issued for, over the whole run.
    pub dispatched: usize,
    /// Identifiers whose single delete attempt failed. These were still
    /// counted as dispatched and will not be re-attempted by this run; they
    /// are listed so the operator can see potential data retention instead
    /// of having it masked.
    pub failed: Vec<DocumentId>,
    /// Successful polls performed.
    pub polls: u64,
    /// True when the run stopped after a dry-run diff instead of draining
    /// the collection.
    pub dry_run: bool,
}

/// Owns the per-run state and the loop.
pub struct PurgeController {
    client: Arc<dyn SearchIndex>,
    scope: Scope,
    config: PurgeConfig,
    observer: Arc<dyn PurgeObserver>,
    /// Every identifier a delete request has been issued for. Grows
    /// monotonically; never persisted — a crash restarts empty, which is
    /// safe because deletes are idempotent.
    dispatched: HashSet<DocumentId>,
    failed: HashSet<DocumentId>,
}

impl PurgeController {
    pub fn new(
        client: Arc<dyn SearchIndex>,
        scope: Scope,
        config: PurgeConfig,
        observer: Arc<dyn PurgeObserver>,
    ) -> Self {
        Self {
            client,
            scope,
            config,
            observer,
            dispatched: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    /// Run to convergence. Returns the summary on success, or
    /// `ScourError::RetriesExhausted` if the index could not be polled
    /// `max_tries` times in a row. Partial deletion state is left as-is on
    /// abort; re-running is safe.
    pub async fn run(mut self) -> Result<PurgeSummary, ScourError> {
        let mut polls: u64 = 0;

        loop {
            let result = self.poll_with_retry().await?;
            polls += 1;

            if result.matching_results == 0 {
                info!(polls, dispatched = self.dispatched.len(), "Index is empty");
                self.observer.on_event(PurgeEvent::Completed);
                return Ok(self.into_summary(polls));
            }

            // Diff the bounded window against what this run already asked
            // the service to delete.
            let pending: HashSet<DocumentId> = result
                .document_ids
                .iter()
                .filter(|id| !self.dispatched.contains(*id))
                .cloned()
                .collect();

            debug!(
                matching_results = result.matching_results,
                visible = result.document_ids.len(),
                pending = pending.len(),
                "Diff computed"
            );

            if self.config.dry_run {
                self.observer.on_event(PurgeEvent::DryRunBatch {
                    batch_size: pending.len(),
                });
                let mut summary = self.into_summary(polls);
                summary.dry_run = true;
                return Ok(summary);
            }

            if pending.is_empty() {
                // Everything visible is already dispatched but the index
                // still reports matches: the deletes have not propagated
                // yet. Wait out the propagation delay, then re-poll.
                self.observer.on_event(PurgeEvent::SettleWait);
                sleep(self.config.settle_wait).await;
                continue;
            }

            self.dispatch_batch(pending).await;
        }
    }

    /// One poll wrapped in the fast fixed-interval retry. The poller itself
    /// never retries; exhaustion here aborts the run.
    async fn poll_with_retry(&self) -> Result<crate::index::QueryResult, ScourError> {
        let client = Arc::clone(&self.client);
        let scope = self.scope.clone();
        let batch_size = self.config.batch_size;
        let observer = Arc::clone(&self.observer);

        retry_fixed(
            self.config.max_tries,
            self.config.retry_wait,
            move || {
                let client = Arc::clone(&client);
                let scope = scope.clone();
                async move { client.query_ids(&scope, batch_size).await }
            },
            move |attempt, error| {
                observer.on_event(PurgeEvent::QueryRetrying {
                    attempt,
                    error: error.to_string(),
                });
            },
        )
        .await
        .map_err(|exhausted| ScourError::RetriesExhausted {
            attempts: exhausted.attempts,
            source: exhausted.last_error,
        })
    }

    /// Dispatch one pending batch and fold the results into the run state.
    /// All attempted identifiers join the dispatched set whatever their
    /// outcome, bounding total request volume; failures are tracked
    /// separately for the summary.
    async fn dispatch_batch(&mut self, pending: HashSet<DocumentId>) {
        let batch_size = pending.len();
        let outcomes = dispatch_deletes(
            self.client.as_ref(),
            &self.scope,
            pending,
            self.config.concurrency,
        )
        .await;

        for (document_id, outcome) in outcomes {
            match outcome {
                DeleteOutcome::Accepted { status } => {
                    self.observer.on_event(PurgeEvent::DeleteResolved {
                        document_id: document_id.clone(),
                        accepted: true,
                        detail: status,
                    });
                }
                DeleteOutcome::Failed(error) => {
                    self.observer.on_event(PurgeEvent::DeleteResolved {
                        document_id: document_id.clone(),
                        accepted: false,
                        detail: Some(error.to_string()),
                    });
                    self.failed.insert(document_id.clone());
                }
            }
            self.dispatched.insert(document_id);
        }

        self.observer.on_event(PurgeEvent::BatchDispatched {
            batch_size,
            total_dispatched: self.dispatched.len(),
        });
    }

    fn into_summary(self, polls: u64) -> PurgeSummary {
        let mut failed: Vec<DocumentId> = self.failed.into_iter().collect();
        failed.sort();
        PurgeSummary {
            dispatched: self.dispatched.len(),
            failed,
            polls,
            dry_run: false,
        }
    }
}
