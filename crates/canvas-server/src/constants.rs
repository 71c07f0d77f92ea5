//! Server defaults
//!
//! Single source of truth for addresses, environment variable names and
//! route paths.

pub mod defaults {
    pub const BIND_ADDR: &str = "127.0.0.1:8000";
    /// Largest accepted image upload
    pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
}

/// Environment variables read at startup
pub mod env {
    /// Path of an optional JSON config file
    pub const CONFIG_PATH: &str = "CANVAS_ASSISTANT_CONFIG";
    pub const BIND_ADDR: &str = "CANVAS_BIND_ADDR";
    pub const OLLAMA_URL: &str = "OLLAMA_URL";
    pub const DEFAULT_MODEL: &str = "CANVAS_DEFAULT_MODEL";
    pub const QDRANT_URL: &str = "QDRANT_URL";
}

pub mod routes {
    pub const HEALTHCHECK: &str = "/healthcheck";
    pub const MODELS: &str = "/models";
    pub const TEXT_PROMPT: &str = "/text-prompt";
    pub const IMAGE_PROMPT: &str = "/image-prompt";
    pub const HANDLE_COMMAND: &str = "/handle-visio-command";
    pub const ASSISTANT: &str = "/assistant";
    pub const COMMAND_SOCKET: &str = "/ws/visio-command";
}
