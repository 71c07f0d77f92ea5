//! In-process action log

use canvas_commands::ActionRecorder;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

/// One executed action as it was reported by the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedAction {
    /// Action tag, e.g. "create_shape"
    pub kind: String,
    /// Shape type, shape id or "A->B" for connections
    pub identifier: String,
    /// Result JSON returned to the caller
    pub payload: Value,
    pub recorded_at: DateTime<Utc>,
}

impl RecordedAction {
    pub fn new(kind: &str, identifier: &str, payload: &Value) -> Self {
        Self {
            kind: kind.to_string(),
            identifier: identifier.to_string(),
            payload: payload.clone(),
            recorded_at: Utc::now(),
        }
    }

    /// Text that represents this action in embedding space
    pub fn embedding_text(&self) -> String {
        format!("{} {} {}", self.kind, self.identifier, self.payload)
    }
}

/// Ordered, append-only history kept in memory
#[derive(Debug, Default)]
pub struct MemoryActionLog {
    entries: Mutex<Vec<RecordedAction>>,
}

impl MemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<RecordedAction> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ActionRecorder for MemoryActionLog {
    fn record(&self, kind: &str, identifier: &str, payload: &Value) {
        log::debug!("Recording {} '{}'", kind, identifier);
        self.entries
            .lock()
            .push(RecordedAction::new(kind, identifier, payload));
    }
}
