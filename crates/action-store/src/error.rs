//! Error types for the action log

use inference::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Qdrant returned {status}: {body}")]
    Qdrant { status: u16, body: String },

    #[error("Embedding failed: {0}")]
    Embedding(#[from] GatewayError),

    #[error("Embedding model returned no vector")]
    EmptyEmbedding,

    #[error("Embedding has {actual} dimensions, collection expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Action log worker has stopped")]
    WorkerStopped,
}
