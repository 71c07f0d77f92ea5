//! Action log defaults
//!
//! Single source of truth for collection names, URLs and sizes.

pub mod defaults {
    /// Local Qdrant REST endpoint
    pub const QDRANT_URL: &str = "http://localhost:6333";
    /// Collection holding executed actions
    pub const COLLECTION: &str = "actions";
    /// Vector size of the default embedding model (nomic-embed-text)
    pub const EMBEDDING_DIMENSIONS: usize = 768;
    /// Matches returned by a similarity search when no limit is given
    pub const SEARCH_LIMIT: usize = 5;
}

/// Keys of the payload stored with every action point
pub mod payload {
    pub const ACTION_NAME: &str = "action_name";
    pub const ACTION_TYPE: &str = "action_type";
    pub const RESULT: &str = "payload";
    pub const RECORDED_AT: &str = "recorded_at";
}
