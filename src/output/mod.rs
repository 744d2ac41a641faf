//! Result persistence and crawl reports
//!
//! This module handles:
//! - Accumulating product URLs from every scheduler into one set
//! - Writing full snapshots of that set as it grows
//! - Summarizing a crawl per seed

mod json_file;
mod memory;
pub mod stats;
mod traits;

pub use json_file::{read_snapshots, JsonFileWriter};
pub use memory::MemoryWriter;
pub use stats::{log_report, print_report, CrawlReport, SeedReport};
pub use traits::{SinkError, SinkResult, SnapshotWriter};

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared, monotonically growing set of product URLs backed by a snapshot writer
///
/// Every scheduler of a crawl persists into the same sink. A write always
/// carries the whole union, so the newest snapshot is a superset of every older
/// one.
pub struct ResultSink {
    products: Mutex<BTreeSet<String>>,
    writer: Arc<dyn SnapshotWriter>,
}

impl ResultSink {
    pub fn new(writer: Arc<dyn SnapshotWriter>) -> Self {
        Self {
            products: Mutex::new(BTreeSet::new()),
            writer,
        }
    }

    /// Sink writing append-mode JSON snapshots to `path`
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonFileWriter::new(path)))
    }

    /// Merges `urls` into the set and writes a snapshot if the set grew
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - New URLs were added and a snapshot was written
    /// * `Ok(false)` - Nothing new; no write
    /// * `Err(SinkError)` - The snapshot could not be written (URLs are still kept)
    pub async fn persist<I>(&self, urls: I) -> SinkResult<bool>
    where
        I: IntoIterator<Item = String>,
    {
        let mut products = self.products.lock().await;
        let before = products.len();
        products.extend(urls);

        if products.len() == before {
            return Ok(false);
        }

        // Lock held across the write so snapshots land in growth order
        let snapshot: Vec<String> = products.iter().cloned().collect();
        self.writer.write_snapshot(&snapshot).await?;
        Ok(true)
    }

    /// Writes the current set unconditionally
    pub async fn flush(&self) -> SinkResult<()> {
        let products = self.products.lock().await;
        let snapshot: Vec<String> = products.iter().cloned().collect();
        self.writer.write_snapshot(&snapshot).await?;
        tracing::info!(destination = %self.writer.target(), count = snapshot.len(), "Results flushed");
        Ok(())
    }

    /// Sorted copy of the current set
    pub async fn snapshot(&self) -> Vec<String> {
        self.products.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.products.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.lock().await.is_empty()
    }

    /// Where snapshots are written
    pub fn target(&self) -> String {
        self.writer.target()
    }
}
