//! Qdrant REST client
//!
//! Only the three calls the action log needs: create a collection, upsert
//! points and run a nearest-neighbour search. Everything goes through the
//! [`VectorStore`] trait so the log can run against an in-memory store in
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::defaults;
use crate::error::StoreError;

/// A point to insert or replace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPoint {
    /// UUID string
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// A search hit
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPoint {
    /// Qdrant ids are either UUID strings or unsigned integers
    pub id: Value,
    pub score: f32,
    #[serde(default)]
    pub payload: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

/// Storage for embedded actions
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection unless it exists. Returns true when it was created.
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<bool, StoreError>;

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), StoreError>;

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError>;
}

pub struct QdrantClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl QdrantClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, name: &str) -> String {
        format!("{}/collections/{}", self.base_url, name)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Qdrant {
            status: status.as_u16(),
            body,
        })
    }
}

impl Default for QdrantClient {
    fn default() -> Self {
        Self::new(defaults::QDRANT_URL)
    }
}

#[async_trait]
impl VectorStore for QdrantClient {
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<bool, StoreError> {
        let url = self.collection_url(name);

        let existing = self.http_client.get(&url).send().await?;
        if existing.status().is_success() {
            log::debug!("Qdrant collection '{}' already exists", name);
            return Ok(false);
        }

        let body = json!({
            "vectors": {
                "size": dimensions,
                "distance": "Cosine",
            }
        });
        let response = self.http_client.put(&url).json(&body).send().await?;

        // Lost a creation race with another process
        if response.status() == reqwest::StatusCode::CONFLICT {
            return Ok(false);
        }
        Self::check(response).await?;

        log::info!(
            "Created Qdrant collection '{}' ({} dimensions)",
            name,
            dimensions
        );
        Ok(true)
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<(), StoreError> {
        let url = format!("{}/points?wait=true", self.collection_url(collection));
        let count = points.len();

        let response = self
            .http_client
            .put(&url)
            .json(&json!({ "points": points }))
            .send()
            .await?;
        Self::check(response).await?;

        log::debug!("Upserted {} point(s) into '{}'", count, collection);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, StoreError> {
        let url = format!("{}/points/search", self.collection_url(collection));
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self.http_client.post(&url).json(&body).send().await?;
        let parsed: SearchResponse = Self::check(response).await?.json().await?;
        Ok(parsed.result)
    }
}
