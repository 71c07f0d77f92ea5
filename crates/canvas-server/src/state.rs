//! Shared handler state and its construction from configuration

use std::sync::Arc;

use action_store::constants::defaults as store_defaults;
use action_store::{MemoryActionLog, QdrantClient, VectorActionLog};
use canvas_commands::{ActionRecorder, CommandProcessor};
use inference::{InferenceGateway, SharedGateway};

use crate::assistant::Assistant;
use crate::config::ServerConfig;
use crate::error::ServerError;

/// Where executed actions are recorded
#[derive(Clone)]
pub enum ActionLog {
    Memory(Arc<MemoryActionLog>),
    Vector(Arc<VectorActionLog>),
}

impl ActionLog {
    pub fn recorder(&self) -> Arc<dyn ActionRecorder> {
        match self {
            ActionLog::Memory(log) => log.clone(),
            ActionLog::Vector(log) => log.clone(),
        }
    }

    /// Flush entries still queued for the vector store
    pub async fn close(&self) {
        if let ActionLog::Vector(log) = self {
            log.close().await;
        }
    }
}

/// Everything a handler needs; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub gateway: SharedGateway,
    pub processor: CommandProcessor,
    pub assistant: Assistant,
    pub action_log: ActionLog,
}

impl AppState {
    pub fn new(config: ServerConfig, gateway: SharedGateway, action_log: ActionLog) -> Self {
        let processor = CommandProcessor::with_recorder(action_log.recorder());
        Self {
            config: Arc::new(config),
            assistant: Assistant::new(gateway.clone(), processor.clone()),
            gateway,
            processor,
            action_log,
        }
    }
}

/// Connect to the model daemon and pick an action log
pub async fn build_state(config: ServerConfig) -> Result<AppState, ServerError> {
    let gateway: SharedGateway = Arc::new(InferenceGateway::from_config(&config.gateway_config())?);
    log::info!(
        "Using {} backend at {} (default model '{}')",
        gateway.backend_name(),
        gateway.base_url().unwrap_or_default(),
        gateway.default_model()
    );
    let action_log = action_log(&config, &gateway).await;
    Ok(AppState::new(config, gateway, action_log))
}

/// Vector log when Qdrant is configured and reachable, memory log otherwise
async fn action_log(config: &ServerConfig, gateway: &SharedGateway) -> ActionLog {
    let memory = || ActionLog::Memory(Arc::new(MemoryActionLog::new()));
    let Some(url) = config.qdrant_url.as_deref() else {
        log::info!("No Qdrant URL configured; keeping the action log in memory");
        return memory();
    };

    match VectorActionLog::start(
        gateway.clone(),
        Arc::new(QdrantClient::new(url)),
        store_defaults::COLLECTION,
        config.embedding_dimensions,
    )
    .await
    {
        Ok(log) => {
            log::info!(
                "Recording actions in '{}' with '{}' embeddings",
                log.collection(),
                gateway.embedding_model()
            );
            ActionLog::Vector(Arc::new(log))
        }
        Err(e) => {
            log::warn!(
                "Qdrant at {} is unavailable ({}); keeping the action log in memory",
                url,
                e
            );
            memory()
        }
    }
}
