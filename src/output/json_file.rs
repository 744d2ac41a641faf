//! Append-mode JSON snapshot file
//!
//! Every write appends one pretty-printed JSON array followed by a newline, so
//! the file is a concatenation of arrays rather than a single JSON document. The
//! last array in the file is the most complete one.

use crate::output::traits::{SinkError, SinkResult, SnapshotWriter};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Writes snapshots to a file, creating its directory on first use
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SnapshotWriter for JsonFileWriter {
    async fn write_snapshot(&self, urls: &[String]) -> SinkResult<()> {
        let mut block = serde_json::to_string_pretty(urls)?;
        block.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        file.write_all(block.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), count = urls.len(), "Snapshot written");
        Ok(())
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parses a snapshot file back into its arrays, oldest first
///
/// Useful for inspecting a run; the crawler itself never reads its output.
pub fn read_snapshots(contents: &str) -> SinkResult<Vec<Vec<String>>> {
    serde_json::Deserializer::from_str(contents)
        .into_iter::<Vec<String>>()
        .map(|block| block.map_err(SinkError::from))
        .collect()
}
