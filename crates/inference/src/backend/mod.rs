//! Pluggable inference backend abstraction
//!
//! All backends implement the same interface so the gateway (and tests) can
//! swap them without touching application code.

pub mod ollama;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};

use crate::types::{GenerateRequest, ModelInfo};

pub use ollama::OllamaBackend;

/// Error types for backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend not ready: {0}")]
    NotReady(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Capabilities that a backend may or may not support
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendCapabilities {
    /// Supports embedding generation
    pub embeddings: bool,
    /// Supports streaming token output
    pub streaming: bool,
    /// Can constrain output to JSON
    pub json_mode: bool,
}

/// A streaming chunk from generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateChunk {
    /// Text content of this chunk
    pub content: Option<String>,
    /// Whether this is the final chunk
    pub done: bool,
}

/// Embedding result
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingResult {
    /// The embedding vector
    pub vector: Vec<f32>,
    /// Number of tokens in the input (0 when the backend does not report it)
    pub token_count: usize,
}

/// Stream of generation chunks
pub type GenerateStream = Pin<Box<dyn Stream<Item = Result<GenerateChunk, BackendError>> + Send>>;

/// The core trait that all inference backends must implement.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    // ─── IDENTITY ───────────────────────────────────────────────────

    /// Human-readable name for logs and status output
    fn name(&self) -> &'static str;

    /// What this backend supports
    fn capabilities(&self) -> BackendCapabilities;

    /// Base URL for HTTP-based backends
    fn base_url(&self) -> Option<String>;

    /// Verify the backend is responding
    async fn health_check(&self) -> bool;

    // ─── INFERENCE ──────────────────────────────────────────────────

    /// Stream generated text for one prompt
    async fn generate_stream(&self, request: GenerateRequest)
        -> Result<GenerateStream, BackendError>;

    /// Models available to this backend
    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError>;

    /// Generate embeddings for the given texts
    async fn embeddings(
        &self,
        texts: Vec<String>,
        model: &str,
    ) -> Result<Vec<EmbeddingResult>, BackendError>;
}
