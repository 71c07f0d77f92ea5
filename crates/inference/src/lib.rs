//! Language-model gateway
//!
//! This library gives the rest of the application one way to talk to a
//! language model:
//! - **Generation**: streamed or collected into a single string
//! - **Model catalog**: names of the models the daemon has pulled
//! - **Embeddings**: vectors for the action log
//!
//! The only shipped backend is Ollama. Tests and embedders plug in their own
//! [`InferenceBackend`] implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use inference::{GatewayConfig, InferenceGateway};
//!
//! let gateway = InferenceGateway::from_config(&GatewayConfig::default())?;
//! let text = gateway.generate("Say hello", None).await?;
//! let models = gateway.list_models().await?;
//! ```

pub mod backend;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod types;

// Re-exports for convenience
pub use backend::{
    BackendCapabilities, BackendError, EmbeddingResult, GenerateChunk, GenerateStream,
    InferenceBackend, OllamaBackend,
};
pub use config::GatewayConfig;
pub use gateway::{collect_text, GatewayError, InferenceGateway, SharedGateway};
pub use types::{GenerateOptions, GenerateRequest, ModelDetails, ModelInfo};
