//! Action log seam
//!
//! The dispatcher reports every successful action to an optional recorder.
//! Recording is fire-and-forget: the recorder returns nothing and its
//! failures never change a result.

use serde_json::Value;

/// Append-only sink for executed actions (audit log, similarity search, ...)
pub trait ActionRecorder: Send + Sync {
    /// Record one executed action.
    ///
    /// `kind` is the action tag, `identifier` names the shape(s) involved and
    /// `payload` is the JSON result that was returned to the caller.
    fn record(&self, kind: &str, identifier: &str, payload: &Value);
}
