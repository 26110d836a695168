//! Feed Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed feed document: {0}")]
    Parse(String),

    #[error("Failed to serialize feed: {0}")]
    Serialize(String),
}
