//! Snapshot writer trait and errors
//!
//! A snapshot is the full, sorted list of product URLs known at the time of the
//! write. Writers never receive deltas.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting results
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write snapshot to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Durable destination for product URL snapshots
///
/// Implementations must be thread-safe; the sink serializes calls so a writer
/// never sees two snapshots at once.
#[async_trait]
pub trait SnapshotWriter: Send + Sync {
    /// Writes one full snapshot
    ///
    /// # Arguments
    ///
    /// * `urls` - Every product URL discovered so far, sorted and deduplicated
    async fn write_snapshot(&self, urls: &[String]) -> SinkResult<()>;

    /// Human readable destination, used in logs
    fn target(&self) -> String;
}
