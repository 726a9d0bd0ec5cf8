//! Error types for the collection purge tool.

use crate::index::DocumentId;
use thiserror::Error;

/// Failures while polling the remote index for document identifiers.
///
/// Any variant is recoverable in the same sense: the poll is retried a fixed
/// number of times with a short wait, and exhausting the retries aborts the
/// run.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query transport error: {0}")]
    Transport(String),

    #[error("Query rejected with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed query response: {0}")]
    MalformedResponse(String),
}

/// Failure of a single delete request.
///
/// Never retried within a run. The identifier is still marked dispatched so
/// total request volume stays bounded; the failure is carried into the run
/// summary instead.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("Delete transport error for {document_id:?}: {message}")]
    Transport {
        document_id: DocumentId,
        message: String,
    },

    #[error("Delete of {document_id:?} rejected with status {status}: {body}")]
    Api {
        document_id: DocumentId,
        status: u16,
        body: String,
    },
}

/// Startup configuration problems. Fatal before any remote call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set. Set it to {hint}.")]
    MissingEnv {
        name: &'static str,
        hint: &'static str,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// Top-level error for the binary surface.
#[derive(Debug, Error)]
pub enum ScourError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Giving up after {attempts} failed polls: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: QueryError,
    },
}
