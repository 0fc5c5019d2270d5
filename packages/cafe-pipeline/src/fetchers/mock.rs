//! Mock fetcher for testing.
//!
//! Provides a scriptable implementation of the PageFetcher trait.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{PageFetcher, ResultHandle, SearchSession};
use crate::types::state::RawState;

/// What opening a scripted result returns.
#[derive(Debug, Clone)]
enum MockDetail {
    State(RawState),
    Fail(String),
}

#[derive(Debug, Clone)]
struct MockResult {
    name: String,
    detail: MockDetail,
}

/// Mock fetcher for testing.
///
/// Results are scripted per query; unknown queries return no results.
///
/// # Example
///
/// ```rust
/// use cafe_pipeline::fetchers::MockFetcher;
/// use serde_json::json;
///
/// let mock = MockFetcher::new()
///     .with_result("성수 로스터리", "카페", json!({"PlaceDetailBase:1": {"name": "카페"}}))
///     .failing_search("합정 스페셜티", 1);
/// ```
#[derive(Default)]
pub struct MockFetcher {
    results: Arc<RwLock<HashMap<String, Vec<MockResult>>>>,
    /// Remaining forced search failures per query
    search_failures: Arc<RwLock<HashMap<String, usize>>>,
    /// Track calls for verification
    search_calls: Arc<RwLock<Vec<String>>>,
    detail_calls: Arc<RwLock<Vec<(String, usize)>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result whose detail page yields `state`.
    pub fn add_result(&self, query: &str, name: &str, state: Value) {
        self.push(query, name, MockDetail::State(RawState::from_value(state)));
    }

    /// Append a result whose detail page fails to load.
    pub fn add_failing_result(&self, query: &str, name: &str, error: &str) {
        self.push(query, name, MockDetail::Fail(error.to_string()));
    }

    /// Make the next `times` searches for `query` fail.
    pub fn fail_search(&self, query: &str, times: usize) {
        self.search_failures
            .write()
            .unwrap()
            .insert(query.to_string(), times);
    }

    pub fn with_result(self, query: &str, name: &str, state: Value) -> Self {
        self.add_result(query, name, state);
        self
    }

    pub fn with_failing_result(self, query: &str, name: &str, error: &str) -> Self {
        self.add_failing_result(query, name, error);
        self
    }

    pub fn failing_search(self, query: &str, times: usize) -> Self {
        self.fail_search(query, times);
        self
    }

    /// Queries passed to `search`, in call order (retries included).
    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.read().unwrap().clone()
    }

    pub fn search_call_count(&self) -> usize {
        self.search_calls.read().unwrap().len()
    }

    /// (query, index) pairs passed to `open_detail`.
    pub fn detail_calls(&self) -> Vec<(String, usize)> {
        self.detail_calls.read().unwrap().clone()
    }

    pub fn detail_call_count(&self) -> usize {
        self.detail_calls.read().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.search_calls.write().unwrap().clear();
        self.detail_calls.write().unwrap().clear();
    }

    fn push(&self, query: &str, name: &str, detail: MockDetail) {
        self.results
            .write()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push(MockResult {
                name: name.to_string(),
                detail,
            });
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            results: Arc::clone(&self.results),
            search_failures: Arc::clone(&self.search_failures),
            search_calls: Arc::clone(&self.search_calls),
            detail_calls: Arc::clone(&self.detail_calls),
        }
    }
}

/// Session over one query's scripted results.
pub struct MockSession {
    query: String,
    results: Vec<MockResult>,
    detail_calls: Arc<RwLock<Vec<(String, usize)>>>,
}

#[async_trait]
impl SearchSession for MockSession {
    async fn list_results(&mut self, max: usize) -> FetchResult<Vec<ResultHandle>> {
        Ok(self
            .results
            .iter()
            .take(max)
            .enumerate()
            .map(|(i, r)| ResultHandle::new(i, r.name.clone()))
            .collect())
    }

    async fn open_detail(&mut self, handle: &ResultHandle) -> FetchResult<RawState> {
        self.detail_calls
            .write()
            .unwrap()
            .push((self.query.clone(), handle.index));

        match self.results.get(handle.index).map(|r| &r.detail) {
            Some(MockDetail::State(state)) => Ok(state.clone()),
            Some(MockDetail::Fail(error)) => Err(FetchError::Navigation(error.clone())),
            None => Err(FetchError::NotFound(format!(
                "result {} of {}",
                handle.index, self.query
            ))),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    type Session = MockSession;

    async fn search(&self, query: &str) -> FetchResult<MockSession> {
        self.search_calls.write().unwrap().push(query.to_string());

        {
            let mut failures = self.search_failures.write().unwrap();
            if let Some(remaining) = failures.get_mut(query) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Timeout {
                        target: query.to_string(),
                    });
                }
            }
        }

        let results = self
            .results
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default();

        Ok(MockSession {
            query: query.to_string(),
            results,
            detail_calls: Arc::clone(&self.detail_calls),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
