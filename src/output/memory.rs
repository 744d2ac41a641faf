//! In-memory snapshot writer

use crate::output::traits::{SinkResult, SnapshotWriter};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Keeps every snapshot in memory
///
/// Clones share the same history, so a test can hand one clone to the sink and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    snapshots: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots written so far, oldest first
    pub fn snapshots(&self) -> Vec<Vec<String>> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// The most recent snapshot, if any
    pub fn last(&self) -> Option<Vec<String>> {
        self.snapshots().pop()
    }

    pub fn write_count(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SnapshotWriter for MemoryWriter {
    async fn write_snapshot(&self, urls: &[String]) -> SinkResult<()> {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push(urls.to_vec());
        }
        Ok(())
    }

    fn target(&self) -> String {
        "memory".to_string()
    }
}
