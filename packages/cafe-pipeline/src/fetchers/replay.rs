//! Replay fetcher - serves state blobs saved to disk.
//!
//! Layout: `<root>/<query with spaces replaced by '_'>/<n>.json`, one file
//! per search result. Files are listed in name order.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{PageFetcher, ResultHandle, SearchSession};
use crate::types::state::RawState;

/// Fetcher backed by a directory of saved state blobs.
#[derive(Debug, Clone)]
pub struct ReplayFetcher {
    root: PathBuf,
}

impl ReplayFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one query's blobs.
    pub fn query_dir(&self, query: &str) -> PathBuf {
        self.root.join(query_dir_name(query))
    }
}

/// Directory name for a query: trimmed, spaces replaced by underscores.
pub fn query_dir_name(query: &str) -> String {
    query.trim().replace(' ', "_")
}

/// Session over one query directory.
#[derive(Debug)]
pub struct ReplaySession {
    files: Vec<PathBuf>,
}

#[async_trait]
impl SearchSession for ReplaySession {
    async fn list_results(&mut self, max: usize) -> FetchResult<Vec<ResultHandle>> {
        Ok(self
            .files
            .iter()
            .take(max)
            .enumerate()
            .map(|(i, path)| {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ResultHandle::new(i, name)
            })
            .collect())
    }

    async fn open_detail(&mut self, handle: &ResultHandle) -> FetchResult<RawState> {
        let path = self
            .files
            .get(handle.index)
            .ok_or_else(|| FetchError::NotFound(format!("result {}", handle.index)))?;

        let bytes = tokio::fs::read(path).await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(RawState::from_value(value))
    }
}

#[async_trait]
impl PageFetcher for ReplayFetcher {
    type Session = ReplaySession;

    async fn search(&self, query: &str) -> FetchResult<ReplaySession> {
        let dir = self.query_dir(query);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(query = %query, dir = %dir.display(), "No saved results");
                return Ok(ReplaySession { files: Vec::new() });
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort_by(|a, b| replay_order(a).cmp(&replay_order(b)));

        debug!(query = %query, files = files.len(), "Replaying saved results");
        Ok(ReplaySession { files })
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Numeric stems first in numeric order, then the rest by name.
fn replay_order(path: &Path) -> (bool, u64, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.parse::<u64>() {
        Ok(n) => (false, n, stem),
        Err(_) => (true, 0, stem),
    }
}
