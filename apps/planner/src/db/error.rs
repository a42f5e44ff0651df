//! Storage error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("review record for item {item_id} is unreadable: {reason}")]
    UnreadableReview { item_id: i64, reason: String },

    #[error("item already in catalog: {0}")]
    DuplicateItem(i64),
}
