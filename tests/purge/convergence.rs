//! End-to-end convergence tests through the crate's public API.
//!
//! A scripted mock index stands in for the hosted service; wait intervals
//! are zeroed so the scenarios run instantly.

use async_trait::async_trait;
use scour::config::PurgeConfig;
use scour::controller::PurgeController;
use scour::error::{DeleteError, QueryError};
use scour::index::{DeleteReceipt, DocumentId, QueryResult, Scope, SearchIndex};
use scour::progress::{NullObserver, PurgeObserver};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct ScriptedIndex {
    polls: Mutex<VecDeque<Result<QueryResult, QueryError>>>,
    deletes: Mutex<Vec<DocumentId>>,
    fail_deletes: HashSet<DocumentId>,
}

impl ScriptedIndex {
    fn new(polls: Vec<Result<QueryResult, QueryError>>) -> Self {
        Self {
            polls: Mutex::new(polls.into()),
            deletes: Mutex::new(Vec::new()),
            fail_deletes: HashSet::new(),
        }
    }
}

#[async_trait]
impl SearchIndex for ScriptedIndex {
    async fn query_ids(&self, _scope: &Scope, _batch_size: u32) -> Result<QueryResult, QueryError> {
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(QueryResult::empty()))
    }

    async fn delete_document(
        &self,
        _scope: &Scope,
        document_id: &DocumentId,
    ) -> Result<DeleteReceipt, DeleteError> {
        self.deletes.lock().unwrap().push(document_id.clone());
        if self.fail_deletes.contains(document_id) {
            Err(DeleteError::Api {
                document_id: document_id.clone(),
                status: 500,
                body: "internal".to_string(),
            })
        } else {
            Ok(DeleteReceipt {
                document_id: document_id.clone(),
                status: Some("deleted".to_string()),
            })
        }
    }
}

fn window(ids: &[&str], total: u64) -> Result<QueryResult, QueryError> {
    Ok(QueryResult {
        matching_results: total,
        document_ids: ids.iter().map(|s| DocumentId::from(*s)).collect(),
    })
}

fn fast_config() -> PurgeConfig {
    PurgeConfig {
        retry_wait: Duration::from_millis(0),
        settle_wait: Duration::from_millis(0),
        ..PurgeConfig::default()
    }
}

fn controller(index: Arc<ScriptedIndex>, config: PurgeConfig) -> PurgeController {
    PurgeController::new(
        index as Arc<dyn SearchIndex>,
        Scope::new("project", "collection"),
        config,
        Arc::new(NullObserver) as Arc<dyn PurgeObserver>,
    )
}

#[tokio::test]
async fn test_drains_a_collection_larger_than_one_window() {
    // 5 documents total, window of at most 3 visible per poll. The index
    // reveals the remainder as earlier deletes propagate.
    let index = Arc::new(ScriptedIndex::new(vec![
        window(&["a", "b", "c"], 5),
        window(&["d", "e", "a"], 5),
        window(&["e"], 1),
        Ok(QueryResult::empty()),
    ]));

    let summary = controller(Arc::clone(&index), fast_config())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.dispatched, 5);
    assert_eq!(summary.polls, 4);
    assert!(summary.failed.is_empty());

    // Exactly one delete per distinct identifier despite window overlap.
    let mut deletes = index.deletes.lock().unwrap().clone();
    deletes.sort();
    let expected: Vec<DocumentId> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|s| DocumentId::from(*s))
        .collect();
    assert_eq!(deletes, expected);
}

#[tokio::test]
async fn test_failed_deletes_are_reported_not_masked() {
    let index = Arc::new(ScriptedIndex {
        fail_deletes: [DocumentId::from("poison")].into_iter().collect(),
        ..ScriptedIndex::new(vec![
            window(&["poison", "fine"], 2),
            Ok(QueryResult::empty()),
        ])
    });

    let summary = controller(Arc::clone(&index), fast_config())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.dispatched, 2);
    assert_eq!(summary.failed, vec![DocumentId::from("poison")]);
}

#[tokio::test]
async fn test_abort_leaves_partial_state_and_is_rerunnable() {
    // First run: one batch dispatched, then the index becomes unreachable.
    let down = || Err(QueryError::Transport("unreachable".to_string()));
    let index = Arc::new(ScriptedIndex::new(vec![
        window(&["a", "b"], 2),
        down(),
        down(),
        down(),
        down(),
        down(),
    ]));

    let err = controller(Arc::clone(&index), fast_config())
        .run()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Giving up after 5"));
    assert_eq!(index.deletes.lock().unwrap().len(), 2);

    // A fresh run starts with an empty dispatched set; re-offering "a" gets
    // it deleted again, which is safe because deletes are idempotent.
    let second = Arc::new(ScriptedIndex::new(vec![
        window(&["a"], 1),
        Ok(QueryResult::empty()),
    ]));
    let summary = controller(Arc::clone(&second), fast_config())
        .run()
        .await
        .unwrap();
    assert_eq!(summary.dispatched, 1);
}
