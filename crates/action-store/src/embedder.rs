//! Text to vector seam

use async_trait::async_trait;
use inference::InferenceGateway;

use crate::error::StoreError;

/// Turns a piece of text into an embedding vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError>;
}

#[async_trait]
impl Embedder for InferenceGateway {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let mut results = self.embeddings(vec![text.to_string()]).await?;
        if results.is_empty() {
            return Err(StoreError::EmptyEmbedding);
        }
        Ok(results.swap_remove(0).vector)
    }
}
