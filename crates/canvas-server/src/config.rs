//! Server configuration
//!
//! Defaults, then an optional JSON file, then environment variables.

use std::net::SocketAddr;
use std::path::Path;

use action_store::constants::defaults as store_defaults;
use inference::constants::defaults as inference_defaults;
use inference::GatewayConfig;
use serde::{Deserialize, Serialize};

use crate::constants::{defaults, env};
use crate::error::ServerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind_addr: String,
    /// Base URL of the Ollama daemon
    pub ollama_url: String,
    /// Model used when a request does not name one
    pub default_model: String,
    /// Qdrant REST endpoint; None keeps the action log in memory
    pub qdrant_url: Option<String>,
    pub embedding_model: String,
    /// Vector size produced by `embedding_model`
    pub embedding_dimensions: usize,
    /// Connect timeout for model calls in seconds
    pub connect_timeout_secs: Option<u64>,
    /// Timeout for model list and embedding calls in seconds. Streamed
    /// generations run as long as tokens keep arriving.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::BIND_ADDR.to_string(),
            ollama_url: inference_defaults::OLLAMA_URL.to_string(),
            default_model: inference_defaults::MODEL.to_string(),
            qdrant_url: None,
            embedding_model: inference_defaults::EMBEDDING_MODEL.to_string(),
            embedding_dimensions: store_defaults::EMBEDDING_DIMENSIONS,
            connect_timeout_secs: Some(inference_defaults::CONNECT_TIMEOUT_SECS),
            request_timeout_secs: Some(inference_defaults::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Load from the file named by `CANVAS_ASSISTANT_CONFIG` (if set) and
    /// apply environment overrides.
    pub async fn load() -> Result<Self, ServerError> {
        let mut config = match std::env::var(env::CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()).await?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ServerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&contents).map_err(|e| {
            ServerError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get(env::BIND_ADDR) {
            self.bind_addr = value;
        }
        if let Some(value) = get(env::OLLAMA_URL) {
            self.ollama_url = value;
        }
        if let Some(value) = get(env::DEFAULT_MODEL) {
            self.default_model = value;
        }
        if let Some(value) = get(env::QDRANT_URL) {
            self.qdrant_url = Some(value);
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        self.bind_addr
            .parse()
            .map_err(|e| ServerError::Config(format!("Invalid bind address '{}': {}", self.bind_addr, e)))
    }

    /// Settings for the inference gateway
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.ollama_url.clone(),
            default_model: self.default_model.clone(),
            embedding_model: self.embedding_model.clone(),
            connect_timeout_secs: self.connect_timeout_secs,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}
