//! Action log for executed canvas commands
//!
//! Two [`ActionRecorder`](canvas_commands::ActionRecorder) implementations:
//! - [`MemoryActionLog`]: ordered in-process history, used when no vector
//!   store is configured and in tests
//! - [`VectorActionLog`]: embeds every action and upserts it into a Qdrant
//!   collection from a background worker, so similar past actions can be
//!   looked up later

pub mod constants;
pub mod embedder;
pub mod error;
pub mod memory;
pub mod qdrant;
pub mod vector_log;

pub use embedder::Embedder;
pub use error::StoreError;
pub use memory::{MemoryActionLog, RecordedAction};
pub use qdrant::{QdrantClient, ScoredPoint, VectorPoint, VectorStore};
pub use vector_log::{ActionMatch, VectorActionLog};
