//! Inference Gateway - Single entry point for all inference operations
//!
//! The gateway owns one backend and fills in the configured model names, so
//! the rest of the application never builds backend requests by hand.

use std::sync::Arc;

use futures_util::StreamExt;

use crate::backend::{
    BackendCapabilities, BackendError, EmbeddingResult, GenerateStream, InferenceBackend,
    OllamaBackend,
};
use crate::config::GatewayConfig;
use crate::types::{GenerateRequest, ModelInfo};

/// Error types for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("No model configured")]
    NoModel,
}

/// The single entry point for ALL inference operations.
///
/// Application code should only interact with InferenceGateway, never
/// with backends directly.
pub struct InferenceGateway {
    backend: Arc<dyn InferenceBackend>,
    default_model: String,
    embedding_model: String,
}

impl InferenceGateway {
    /// Create a gateway over an arbitrary backend
    pub fn new(backend: Arc<dyn InferenceBackend>, config: &GatewayConfig) -> Self {
        Self {
            backend,
            default_model: config.default_model.clone(),
            embedding_model: config.embedding_model.clone(),
        }
    }

    /// Create a gateway talking to the Ollama daemon named in `config`
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let backend = OllamaBackend::from_config(config)?;
        log::info!(
            "Inference gateway using {} at {} (default model '{}')",
            backend.name(),
            config.base_url,
            config.default_model
        );
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn base_url(&self) -> Option<String> {
        self.backend.base_url()
    }

    pub fn capabilities(&self) -> BackendCapabilities {
        self.backend.capabilities()
    }

    /// Check if the backend is responding
    pub async fn health_check(&self) -> bool {
        self.backend.health_check().await
    }

    /// Stream a completion. An empty model name means the default model.
    pub async fn generate_stream(
        &self,
        mut request: GenerateRequest,
    ) -> Result<GenerateStream, GatewayError> {
        request.model = self.resolve_model(Some(&request.model))?;
        Ok(self.backend.generate_stream(request).await?)
    }

    /// Run a request to completion and return the trimmed text
    pub async fn complete(&self, request: GenerateRequest) -> Result<String, GatewayError> {
        let stream = self.generate_stream(request).await?;
        collect_text(stream).await
    }

    /// Complete a bare prompt with an optional model override
    pub async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, GatewayError> {
        let model = self.resolve_model(model)?;
        self.complete(GenerateRequest::new(model, prompt)).await
    }

    /// Names of the locally installed models
    pub async fn list_models(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self
            .list_model_details()
            .await?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    pub async fn list_model_details(&self) -> Result<Vec<ModelInfo>, GatewayError> {
        Ok(self.backend.list_models().await?)
    }

    /// Embed texts with the configured embedding model
    pub async fn embeddings(&self, texts: Vec<String>) -> Result<Vec<EmbeddingResult>, GatewayError> {
        if self.embedding_model.trim().is_empty() {
            return Err(GatewayError::NoModel);
        }
        Ok(self.backend.embeddings(texts, &self.embedding_model).await?)
    }

    fn resolve_model(&self, requested: Option<&str>) -> Result<String, GatewayError> {
        let model = match requested.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.default_model.trim(),
        };
        if model.is_empty() {
            return Err(GatewayError::NoModel);
        }
        Ok(model.to_string())
    }
}

/// Concatenate a stream's text until the final chunk, trimming the result
pub async fn collect_text(mut stream: GenerateStream) -> Result<String, GatewayError> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(content) = chunk.content {
            text.push_str(&content);
        }
        if chunk.done {
            break;
        }
    }
    Ok(text.trim().to_string())
}

/// Thread-safe shared gateway
pub type SharedGateway = Arc<InferenceGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerateChunk;
    use async_trait::async_trait;
    use futures_util::stream;
    use parking_lot::Mutex;

    /// Replays fixed chunks and remembers the last request
    struct ScriptedBackend {
        chunks: Vec<&'static str>,
        last_request: Mutex<Option<GenerateRequest>>,
    }

    impl ScriptedBackend {
        fn new(chunks: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                chunks,
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "Scripted"
        }

        fn capabilities(&self) -> BackendCapabilities {
            BackendCapabilities::default()
        }

        fn base_url(&self) -> Option<String> {
            None
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn generate_stream(
            &self,
            request: GenerateRequest,
        ) -> Result<GenerateStream, BackendError> {
            *self.last_request.lock() = Some(request);
            let mut items: Vec<Result<GenerateChunk, BackendError>> = self
                .chunks
                .iter()
                .map(|c| {
                    Ok(GenerateChunk {
                        content: Some(c.to_string()),
                        done: false,
                    })
                })
                .collect();
            items.push(Ok(GenerateChunk {
                content: None,
                done: true,
            }));
            // Anything after the final chunk must be ignored
            items.push(Ok(GenerateChunk {
                content: Some("ignored".to_string()),
                done: false,
            }));
            Ok(Box::pin(stream::iter(items)))
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
            Ok(serde_json::from_str(r#"[{"name":"llama3.2"},{"name":"mistral"}]"#).unwrap())
        }

        async fn embeddings(
            &self,
            texts: Vec<String>,
            _model: &str,
        ) -> Result<Vec<EmbeddingResult>, BackendError> {
            Ok(texts
                .iter()
                .map(|t| EmbeddingResult {
                    vector: vec![t.len() as f32],
                    token_count: 1,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_generate_uses_default_model() {
        let backend = ScriptedBackend::new(vec!["  {\"action\":", " \"delete_shape\"}\n"]);
        let gateway = InferenceGateway::new(backend.clone(), &GatewayConfig::default());

        let text = gateway.generate("delete it", None).await.unwrap();
        assert_eq!(text, "{\"action\": \"delete_shape\"}");

        let request = backend.last_request.lock().clone().unwrap();
        assert_eq!(request.model, "llama3.2");
        assert_eq!(request.prompt, "delete it");
    }

    #[tokio::test]
    async fn test_model_override() {
        let backend = ScriptedBackend::new(vec!["ok"]);
        let gateway = InferenceGateway::new(backend.clone(), &GatewayConfig::default());

        gateway.generate("hi", Some("mistral")).await.unwrap();
        assert_eq!(backend.last_request.lock().as_ref().unwrap().model, "mistral");

        // Blank override falls back to the default
        gateway.complete(GenerateRequest::new("  ", "hi")).await.unwrap();
        assert_eq!(backend.last_request.lock().as_ref().unwrap().model, "llama3.2");
    }

    #[tokio::test]
    async fn test_no_model_configured() {
        let config = GatewayConfig {
            default_model: String::new(),
            ..Default::default()
        };
        let gateway = InferenceGateway::new(ScriptedBackend::new(vec![]), &config);
        assert!(matches!(
            gateway.generate("hi", None).await,
            Err(GatewayError::NoModel)
        ));
    }

    #[tokio::test]
    async fn test_list_models_and_embeddings() {
        let gateway =
            InferenceGateway::new(ScriptedBackend::new(vec![]), &GatewayConfig::default());
        assert_eq!(gateway.list_models().await.unwrap(), vec!["llama3.2", "mistral"]);

        let embeddings = gateway
            .embeddings(vec!["abc".to_string(), "de".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].vector, vec![3.0]);
    }

    #[tokio::test]
    async fn test_collect_text_propagates_errors() {
        let items: Vec<Result<GenerateChunk, BackendError>> = vec![
            Ok(GenerateChunk {
                content: Some("partial".to_string()),
                done: false,
            }),
            Err(BackendError::Inference("model crashed".to_string())),
        ];
        let result = collect_text(Box::pin(stream::iter(items))).await;
        assert!(matches!(result, Err(GatewayError::Backend(BackendError::Inference(_)))));
    }
}
