//! Remote Search Index Access
//!
//! The `SearchIndex` trait is the seam between the convergence loop and the
//! hosted document-search service: one bounded read-only poll for visible
//! document identifiers, and one delete request per identifier. The HTTP
//! implementation talks to the service's V2 document API; tests substitute a
//! scripted mock.

use crate::config::Credentials;
use crate::error::{DeleteError, QueryError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// API version pinned for every request.
const API_VERSION: &str = "2021-04-20";

/// Identifies the target collection: a (project, collection) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub project_id: String,
    pub collection_id: String,
}

impl Scope {
    pub fn new(project_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            collection_id: collection_id.into(),
        }
    }
}

/// Opaque document identifier. No structure beyond equality and hashing is
/// assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(s.to_string())
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot returned by one poll: the index's total match count and up to
/// `batch_size` identifiers currently visible. Discarded after each
/// iteration's diff.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub matching_results: u64,
    pub document_ids: Vec<DocumentId>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            matching_results: 0,
            document_ids: Vec::new(),
        }
    }
}

/// Acknowledgement returned by the service for one delete request.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteReceipt {
    pub document_id: DocumentId,
    #[serde(default)]
    pub status: Option<String>,
}

/// Abstracts the hosted search service behind the two operations the purge
/// loop needs. Implementations are injected into the controller, which keeps
/// the loop testable against a mock.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Query the index for up to `batch_size` document identifiers visible in
    /// the scoped collection. Read-only; performs no retries itself.
    async fn query_ids(&self, scope: &Scope, batch_size: u32) -> Result<QueryResult, QueryError>;

    /// Issue one delete request for `document_id`. Exactly one attempt; the
    /// caller decides what to do with a failure.
    async fn delete_document(
        &self,
        scope: &Scope,
        document_id: &DocumentId,
    ) -> Result<DeleteReceipt, DeleteError>;
}

// Wire structures for the V2 query endpoint. Extra response fields are
// ignored.
#[derive(Deserialize)]
struct QueryResponse {
    matching_results: u64,
    #[serde(default)]
    results: Vec<QueryResultRecord>,
}

#[derive(Deserialize)]
struct QueryResultRecord {
    document_id: DocumentId,
}

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn map_query_transport_error(error: reqwest::Error) -> QueryError {
    if error.is_timeout() {
        QueryError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        QueryError::Transport(format!("Connection error: {}", error))
    } else {
        QueryError::Transport(format!("HTTP error: {}", error))
    }
}

/// HTTP client against the service's V2 document API.
pub struct HttpIndexClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpIndexClient {
    /// Build the client. `accept_invalid_certs` disables TLS certificate
    /// verification and must only be set for private trusted-network
    /// deployments; it is off unless the operator passes `--insecure`.
    pub fn new(credentials: &Credentials, accept_invalid_certs: bool) -> Result<Self, QueryError> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| QueryError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
        })
    }

    fn query_url(&self, scope: &Scope) -> String {
        format!(
            "{}/v2/projects/{}/query?version={}",
            self.base_url, scope.project_id, API_VERSION
        )
    }

    fn delete_url(&self, scope: &Scope, document_id: &DocumentId) -> String {
        format!(
            "{}/v2/projects/{}/collections/{}/documents/{}?version={}",
            self.base_url, scope.project_id, scope.collection_id, document_id, API_VERSION
        )
    }
}

#[async_trait]
impl SearchIndex for HttpIndexClient {
    async fn query_ids(&self, scope: &Scope, batch_size: u32) -> Result<QueryResult, QueryError> {
        // Empty query text matches everything; projection limited to the
        // identifier field keeps the response small.
        let body = json!({
            "collection_ids": [scope.collection_id],
            "query": "",
            "count": batch_size,
            "return": ["document_id"],
        });

        let response = self
            .client
            .post(self.query_url(scope))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_query_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(QueryError::Api { status, body });
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| QueryError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        debug!(
            matching_results = parsed.matching_results,
            returned = parsed.results.len(),
            "Index poll returned"
        );

        Ok(QueryResult {
            matching_results: parsed.matching_results,
            document_ids: parsed.results.into_iter().map(|r| r.document_id).collect(),
        })
    }

    async fn delete_document(
        &self,
        scope: &Scope,
        document_id: &DocumentId,
    ) -> Result<DeleteReceipt, DeleteError> {
        let response = self
            .client
            .delete(self.delete_url(scope, document_id))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| DeleteError::Transport {
                document_id: document_id.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DeleteError::Api {
                document_id: document_id.clone(),
                status,
                body,
            });
        }

        // Some deployments answer 204 with an empty body; synthesize the
        // receipt in that case.
        match response.json::<DeleteReceipt>().await {
            Ok(receipt) => Ok(receipt),
            Err(_) => Ok(DeleteReceipt {
                document_id: document_id.clone(),
                status: None,
            }),
        }
    }
}
