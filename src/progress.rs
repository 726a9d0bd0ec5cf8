//! Progress reporting for a purge run.
//!
//! The controller narrates the run through a sink trait so the binary can
//! print operator-facing lines while tests collect events. Events carry the
//! facts; rendering belongs to the sink.

use crate::index::DocumentId;

/// One observable moment in a purge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeEvent {
    /// A poll attempt failed and will be retried after the fast wait.
    QueryRetrying { attempt: u32, error: String },
    /// One delete attempt finished.
    DeleteResolved {
        document_id: DocumentId,
        accepted: bool,
        detail: Option<String>,
    },
    /// A batch finished; `total_dispatched` counts the whole run so far.
    BatchDispatched {
        batch_size: usize,
        total_dispatched: usize,
    },
    /// Every visible identifier is already dispatched; waiting for the index
    /// to catch up before re-polling.
    SettleWait,
    /// Dry run: these identifiers would have been deleted.
    DryRunBatch { batch_size: usize },
    /// The index reported zero matches.
    Completed,
}

/// Receives purge events. Implementations must not block the loop for long;
/// the stdout reporter just prints a line per event.
pub trait PurgeObserver: Send + Sync {
    fn on_event(&self, event: PurgeEvent);
}

/// Discards all events. Useful when embedding the controller.
pub struct NullObserver;

impl PurgeObserver for NullObserver {
    fn on_event(&self, _event: PurgeEvent) {}
}

/// Renders events as the line-oriented operator text on stdout.
pub struct StdoutReporter;

impl PurgeObserver for StdoutReporter {
    fn on_event(&self, event: PurgeEvent) {
        match event {
            PurgeEvent::QueryRetrying { attempt, error } => {
                println!(
                    "Got an error while querying the collection (attempt {}): {}. Will try again...",
                    attempt, error
                );
            }
            PurgeEvent::DeleteResolved {
                document_id,
                accepted,
                detail,
            } => {
                if accepted {
                    match detail {
                        Some(status) => println!("{}: {}", document_id, status),
                        None => println!("{}: deleted", document_id),
                    }
                } else {
                    let detail = detail.unwrap_or_else(|| "delete failed".to_string());
                    println!("{}: FAILED ({})", document_id, detail);
                }
            }
            PurgeEvent::BatchDispatched {
                total_dispatched, ..
            } => {
                println!("{} delete requests sent.", total_dispatched);
            }
            PurgeEvent::SettleWait => {
                println!("Waiting for delete requests to reach the index...");
            }
            PurgeEvent::DryRunBatch { batch_size } => {
                println!("Dry run: {} documents would be deleted.", batch_size);
            }
            PurgeEvent::Completed => {
                println!("No documents found in the collection.");
            }
        }
    }
}
