//! Configuration types for the inference library

use serde::{Deserialize, Serialize};

use crate::constants::defaults;

/// Where the language model lives and which model to use by default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the Ollama daemon (e.g., "http://localhost:11434")
    pub base_url: String,
    /// Model for requests that do not name one (e.g., "llama3.2")
    pub default_model: String,
    /// Model used to embed action log entries
    pub embedding_model: String,
    /// Connection timeout in seconds (None = no timeout)
    pub connect_timeout_secs: Option<u64>,
    /// Timeout in seconds for non-streaming calls (None = no timeout).
    /// Generation streams are never cut off while tokens keep arriving.
    pub request_timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OLLAMA_URL.to_string(),
            default_model: defaults::MODEL.to_string(),
            embedding_model: defaults::EMBEDDING_MODEL.to_string(),
            connect_timeout_secs: Some(defaults::CONNECT_TIMEOUT_SECS),
            request_timeout_secs: Some(defaults::REQUEST_TIMEOUT_SECS),
        }
    }
}
