//! Vector-backed action log
//!
//! `record` is called synchronously by the dispatcher, so it only pushes the
//! entry onto an unbounded channel. A single worker task embeds entries and
//! upserts them in arrival order; failures are logged and the entry dropped.
//! [`VectorActionLog::close`] stops intake and waits for the queue to drain.

use std::sync::Arc;

use canvas_commands::ActionRecorder;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::constants::payload;
use crate::embedder::Embedder;
use crate::error::StoreError;
use crate::memory::RecordedAction;
use crate::qdrant::{ScoredPoint, VectorPoint, VectorStore};

/// A past action similar to a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionMatch {
    pub score: f32,
    pub action_name: String,
    pub action_type: String,
    pub payload: Value,
}

impl From<ScoredPoint> for ActionMatch {
    fn from(point: ScoredPoint) -> Self {
        let body = point.payload.unwrap_or(Value::Null);
        let text = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            score: point.score,
            action_name: text(payload::ACTION_NAME),
            action_type: text(payload::ACTION_TYPE),
            payload: body.get(payload::RESULT).cloned().unwrap_or(Value::Null),
        }
    }
}

/// Everything the worker and the search path share
struct Backing {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
    dimensions: usize,
}

impl Backing {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let vector = self.embedder.embed(text).await?;
        if vector.len() != self.dimensions {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    async fn store(&self, entry: &RecordedAction) -> Result<String, StoreError> {
        let vector = self.embed(&entry.embedding_text()).await?;

        let mut body = Map::new();
        body.insert(payload::ACTION_NAME.into(), entry.identifier.clone().into());
        body.insert(payload::ACTION_TYPE.into(), entry.kind.clone().into());
        body.insert(payload::RESULT.into(), entry.payload.clone());
        body.insert(
            payload::RECORDED_AT.into(),
            entry.recorded_at.to_rfc3339().into(),
        );

        let id = Uuid::new_v4().to_string();
        let point = VectorPoint {
            id: id.clone(),
            vector,
            payload: Value::Object(body),
        };
        self.store.upsert(&self.collection, vec![point]).await?;
        Ok(id)
    }
}

/// Action log that makes executed actions searchable by similarity
pub struct VectorActionLog {
    /// None once closed
    sender: Mutex<Option<mpsc::UnboundedSender<RecordedAction>>>,
    backing: Arc<Backing>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl VectorActionLog {
    /// Ensure the collection exists, then start the background worker.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self, StoreError> {
        let collection = collection.into();
        store.ensure_collection(&collection, dimensions).await?;

        let backing = Arc::new(Backing {
            embedder,
            store,
            collection,
            dimensions,
        });

        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(receiver, backing.clone()));

        log::info!(
            "Vector action log writing to collection '{}'",
            backing.collection
        );

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            backing,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn collection(&self) -> &str {
        &self.backing.collection
    }

    /// Past actions closest to `query`, best match first
    pub async fn search_similar(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ActionMatch>, StoreError> {
        let vector = self.backing.embed(query).await?;
        let hits = self
            .backing
            .store
            .search(&self.backing.collection, vector, limit)
            .await?;
        Ok(hits.into_iter().map(ActionMatch::from).collect())
    }

    /// Stop accepting entries and wait until queued ones are written.
    ///
    /// Works through a shared reference, so the log can be closed while
    /// processors still hold it. Later calls return at once.
    pub async fn close(&self) {
        drop(self.sender.lock().take());

        let worker = self.worker.lock().take();
        let Some(worker) = worker else {
            return;
        };
        if let Err(e) = worker.await {
            log::error!("Action log worker panicked: {}", e);
        }
        log::info!("Vector action log for '{}' closed", self.backing.collection);
    }
}

impl ActionRecorder for VectorActionLog {
    fn record(&self, kind: &str, identifier: &str, payload: &Value) {
        let entry = RecordedAction::new(kind, identifier, payload);
        let sent = match self.sender.lock().as_ref() {
            Some(sender) => sender.send(entry).is_ok(),
            None => false,
        };
        if !sent {
            log::warn!("{}; dropping {} '{}'", StoreError::WorkerStopped, kind, identifier);
        }
    }
}

async fn run_worker(mut receiver: mpsc::UnboundedReceiver<RecordedAction>, backing: Arc<Backing>) {
    while let Some(entry) = receiver.recv().await {
        match backing.store(&entry).await {
            Ok(id) => log::debug!(
                "Stored {} '{}' as point {}",
                entry.kind,
                entry.identifier,
                id
            ),
            Err(e) => log::error!(
                "Failed to store {} '{}' in action log: {}",
                entry.kind,
                entry.identifier,
                e
            ),
        }
    }
    log::debug!("Action log worker for '{}' finished", backing.collection);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use canvas_commands::CommandProcessor;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Embeds text as [length, 1.0, 0.0]
    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
            Ok(vec![text.len() as f32, 1.0, 0.0])
        }
    }

    #[derive(Default)]
    struct InMemoryStore {
        collections: Mutex<Vec<(String, usize)>>,
        points: Mutex<Vec<VectorPoint>>,
    }

    #[async_trait]
    impl VectorStore for InMemoryStore {
        async fn ensure_collection(
            &self,
            name: &str,
            dimensions: usize,
        ) -> Result<bool, StoreError> {
            let mut collections = self.collections.lock();
            if collections.iter().any(|(n, _)| n == name) {
                return Ok(false);
            }
            collections.push((name.to_string(), dimensions));
            Ok(true)
        }

        async fn upsert(
            &self,
            _collection: &str,
            points: Vec<VectorPoint>,
        ) -> Result<(), StoreError> {
            self.points.lock().extend(points);
            Ok(())
        }

        async fn search(
            &self,
            _collection: &str,
            vector: Vec<f32>,
            limit: usize,
        ) -> Result<Vec<ScoredPoint>, StoreError> {
            // Closest length wins
            let mut hits: Vec<ScoredPoint> = self
                .points
                .lock()
                .iter()
                .map(|p| ScoredPoint {
                    id: json!(p.id),
                    score: 1.0 / (1.0 + (p.vector[0] - vector[0]).abs()),
                    payload: Some(p.payload.clone()),
                })
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(limit);
            Ok(hits)
        }
    }

    async fn start_log(store: Arc<InMemoryStore>, dimensions: usize) -> VectorActionLog {
        VectorActionLog::start(Arc::new(LengthEmbedder), store, "actions", dimensions)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_creates_collection_once() {
        let store = Arc::new(InMemoryStore::default());
        start_log(store.clone(), 3).await.close().await;
        start_log(store.clone(), 3).await.close().await;
        assert_eq!(*store.collections.lock(), vec![("actions".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_recorded_actions_are_upserted_in_order() {
        let store = Arc::new(InMemoryStore::default());
        let log = Arc::new(start_log(store.clone(), 3).await);

        let processor = CommandProcessor::with_recorder(log.clone());
        processor
            .process(
                r#"[
                    {"action": "create_shape", "shape": "circle", "radius": 10},
                    {"action": "delete_shape", "shape_id": "s4"}
                ]"#,
            )
            .unwrap();
        log.close().await;

        let points = store.points.lock().clone();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].payload["action_type"], "create_shape");
        assert_eq!(points[0].payload["action_name"], "circle");
        assert_eq!(points[0].payload["payload"]["dimensions"]["width"], 20.0);
        assert_eq!(points[1].payload["action_name"], "s4");
        assert_ne!(points[0].id, points[1].id);
        assert!(Uuid::parse_str(&points[0].id).is_ok());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_drops_entry() {
        let store = Arc::new(InMemoryStore::default());
        let log = start_log(store.clone(), 768).await;

        log.record("delete_shape", "s1", &json!({"status": "success"}));
        log.close().await;

        assert!(store.points.lock().is_empty());
    }

    #[tokio::test]
    async fn test_search_similar() {
        let store = Arc::new(InMemoryStore::default());
        let log = start_log(store.clone(), 3).await;

        log.record("delete_shape", "s1", &json!({}));
        log.record("create_shape", "rectangle", &json!({"color": "blue"}));

        // Wait for the worker by swapping in a fresh log over the same store
        log.close().await;
        let log = start_log(store.clone(), 3).await;

        let matches = log.search_similar("create_shape rectangle {\"color\":\"blue\"}", 1).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].action_type, "create_shape");
        assert_eq!(matches[0].action_name, "rectangle");
        assert_eq!(matches[0].payload, json!({"color": "blue"}));
        assert_eq!(matches[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_close_drains_queue_while_shared() {
        let store = Arc::new(InMemoryStore::default());
        let log = Arc::new(start_log(store.clone(), 3).await);
        let processor = CommandProcessor::with_recorder(log.clone());

        for id in ["a", "b", "c"] {
            processor
                .process(&format!(r#"{{"action": "delete_shape", "shape_id": "{}"}}"#, id))
                .unwrap();
        }
        log.close().await;
        assert_eq!(store.points.lock().len(), 3);

        // Closed: later actions are dropped, closing again is a no-op
        processor
            .process(r#"{"action": "delete_shape", "shape_id": "d"}"#)
            .unwrap();
        log.close().await;
        assert_eq!(store.points.lock().len(), 3);
    }

    #[test]
    fn test_match_from_point_without_payload() {
        let hit = ScoredPoint {
            id: json!(1),
            score: 0.3,
            payload: None,
        };
        let matched = ActionMatch::from(hit);
        assert_eq!(matched.action_name, "");
        assert_eq!(matched.payload, Value::Null);
    }
}
