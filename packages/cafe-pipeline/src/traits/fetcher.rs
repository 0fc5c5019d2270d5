//! PageFetcher trait: the boundary to whatever drives the map application.
//!
//! The collector never touches a browser. It asks a fetcher to run a search,
//! lists result handles from the resulting session, and opens each handle to
//! get the detail page's state blob.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut session = fetcher.search("성수 로스터리").await?;
//! for handle in session.list_results(10).await? {
//!     let state = session.open_detail(&handle).await?;
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;
use crate::types::state::RawState;

/// Reference to one entry of a search result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultHandle {
    /// Position in the result list
    pub index: usize,

    /// Listing title, for logging only
    pub name: String,
}

impl ResultHandle {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// A search that has been issued and can be browsed.
#[async_trait]
pub trait SearchSession: Send {
    /// Up to `max` result handles. An empty list is a valid outcome.
    async fn list_results(&mut self, max: usize) -> FetchResult<Vec<ResultHandle>>;

    /// Open one result and return its state blob.
    async fn open_detail(&mut self, handle: &ResultHandle) -> FetchResult<RawState>;
}

/// Issues searches against the map application.
///
/// Failures are transient from the caller's point of view: the collector
/// retries and then skips the query.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Session: SearchSession;

    /// Run a search query.
    async fn search(&self, query: &str) -> FetchResult<Self::Session>;

    /// Fetcher name for logs.
    fn name(&self) -> &str;
}
