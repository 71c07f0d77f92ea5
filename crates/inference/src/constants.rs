//! Inference defaults
//!
//! Single source of truth for URLs, model names and timeouts.

/// Default values for gateway configuration
pub mod defaults {
    /// Local Ollama daemon
    pub const OLLAMA_URL: &str = "http://localhost:11434";
    /// Model used when a request does not name one
    pub const MODEL: &str = "llama3.2";
    /// Model used for action log embeddings
    pub const EMBEDDING_MODEL: &str = "nomic-embed-text";
    /// Time allowed to open a connection to the daemon
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Upper bound for calls that return one body (model list, embeddings).
    /// Streamed generations have no total deadline.
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
    /// Health check deadline
    pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
}

/// Ollama REST endpoints, relative to the base URL
pub mod endpoints {
    pub const GENERATE: &str = "/api/generate";
    pub const TAGS: &str = "/api/tags";
    pub const EMBED: &str = "/api/embed";
}
