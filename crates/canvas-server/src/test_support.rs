//! Scripted model backend shared by the handler tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream;
use inference::{
    BackendCapabilities, BackendError, EmbeddingResult, GatewayConfig, GenerateChunk,
    GenerateRequest, GenerateStream, InferenceBackend, InferenceGateway, ModelInfo,
    SharedGateway,
};
use parking_lot::Mutex;

/// Answers generate calls from a queue and records every request
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
    pub offline: bool,
    /// Report no JSON mode support
    pub plain_text: bool,
}

impl ScriptedBackend {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        })
    }

    pub fn without_json_mode(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            plain_text: true,
            ..Default::default()
        })
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self {
            offline: true,
            ..Default::default()
        })
    }

    pub fn gateway(self: &Arc<Self>) -> SharedGateway {
        Arc::new(InferenceGateway::new(self.clone(), &GatewayConfig::default()))
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            embeddings: true,
            streaming: true,
            json_mode: !self.plain_text,
        }
    }

    fn base_url(&self) -> Option<String> {
        None
    }

    async fn health_check(&self) -> bool {
        !self.offline
    }

    async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateStream, BackendError> {
        if self.offline {
            return Err(BackendError::NotReady("connection refused".to_string()));
        }
        self.requests.lock().push(request);

        let reply = self.replies.lock().pop_front().unwrap_or_default();
        // Split the reply to exercise chunk concatenation
        let middle = reply.char_indices().nth(reply.chars().count() / 2).map_or(0, |(i, _)| i);
        let (head, tail) = reply.split_at(middle);
        let chunks: Vec<Result<GenerateChunk, BackendError>> = vec![
            Ok(GenerateChunk {
                content: Some(head.to_string()),
                done: false,
            }),
            Ok(GenerateChunk {
                content: Some(tail.to_string()),
                done: false,
            }),
            Ok(GenerateChunk {
                content: None,
                done: true,
            }),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        if self.offline {
            return Err(BackendError::NotReady("connection refused".to_string()));
        }
        Ok(serde_json::from_str(r#"[{"name":"llama3.2:latest"},{"name":"nomic-embed-text:latest"}]"#)
            .unwrap())
    }

    async fn embeddings(
        &self,
        texts: Vec<String>,
        _model: &str,
    ) -> Result<Vec<EmbeddingResult>, BackendError> {
        Ok(texts
            .iter()
            .map(|_| EmbeddingResult {
                vector: vec![1.0, 0.0, 0.0],
                token_count: 0,
            })
            .collect())
    }
}
