//! Collection pipeline - search, extract, filter, and accumulate stores.
//!
//! Per query: search (with retries) → list results → open each result and
//! extract → accept or reject. The run stops as soon as the store cap is
//! reached; stores accepted before that stay valid.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::FetchResult;
use crate::pipeline::coffee::CoffeeClassifier;
use crate::pipeline::extract::{Extracted, StateExtractor};
use crate::traits::fetcher::{PageFetcher, SearchSession};
use crate::types::config::CollectConfig;
use crate::types::place::{normalize_address, MenuItem, Place, Store};
use crate::types::run_log::{QueryLog, RunLog};

/// Why a place was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No place name could be extracted
    ExtractionFailed,

    /// Address outside the target region
    OutOfRegion,

    /// Address already accepted in this run
    Duplicate,

    /// No menu item survived coffee filtering
    NoCoffeeMenu,

    /// Store cap already reached
    CapReached,
}

/// Outcome of offering a place to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected(RejectReason),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }
}

/// Stores accepted so far in a run, keyed by normalized address.
///
/// The cap check, the duplicate check and the insert all happen in
/// [`try_accept`](Self::try_accept) under one `&mut` borrow. Callers that
/// share a state across tasks must keep that call behind a single lock.
#[derive(Debug, Clone)]
pub struct CollectionState {
    region: String,
    max_stores: usize,
    stores: IndexMap<String, Store>,
}

impl CollectionState {
    pub fn new(region: impl Into<String>, max_stores: usize) -> Self {
        Self {
            region: region.into(),
            max_stores,
            stores: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.stores.len() >= self.max_stores
    }

    pub fn contains_address(&self, address: &str) -> bool {
        self.stores.contains_key(&normalize_address(address))
    }

    /// Apply the accept/reject policy and insert on acceptance.
    ///
    /// Checks run in order: name, region, duplicate, menus.
    pub fn try_accept(&mut self, place: Place, menus: Vec<MenuItem>) -> Decision {
        if self.is_full() {
            return Decision::Rejected(RejectReason::CapReached);
        }
        if place.is_empty() {
            return Decision::Rejected(RejectReason::ExtractionFailed);
        }
        if !place.address.contains(&self.region) {
            return Decision::Rejected(RejectReason::OutOfRegion);
        }

        let key = place.address_key();
        if self.stores.contains_key(&key) {
            return Decision::Rejected(RejectReason::Duplicate);
        }

        match Store::new(place, menus) {
            Some(store) => {
                self.stores.insert(key, store);
                Decision::Accepted
            }
            None => Decision::Rejected(RejectReason::NoCoffeeMenu),
        }
    }

    pub fn stores(&self) -> impl Iterator<Item = &Store> {
        self.stores.values()
    }

    /// Accepted stores in acceptance order.
    pub fn into_stores(self) -> Vec<Store> {
        self.stores.into_values().collect()
    }
}

/// Result of a collection run.
#[derive(Debug, Clone)]
pub struct CollectOutcome {
    pub stores: Vec<Store>,
    pub log: RunLog,
}

impl CollectOutcome {
    pub fn total_menus(&self) -> usize {
        self.stores.iter().map(|s| s.menus.len()).sum()
    }
}

/// Drives a [`PageFetcher`] over the configured queries.
pub struct Collector<F: PageFetcher> {
    fetcher: F,
    config: CollectConfig,
    extractor: StateExtractor,
    coffee: CoffeeClassifier,
}

impl<F: PageFetcher> Collector<F> {
    pub fn new(fetcher: F, config: CollectConfig) -> Self {
        Self {
            extractor: StateExtractor::new(config.keys.clone()),
            coffee: CoffeeClassifier::new(&config.coffee),
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &CollectConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run every query until done or the cap is reached.
    ///
    /// Query failures are recorded in the log and never abort the run.
    pub async fn run(&self) -> CollectOutcome {
        let mut state = CollectionState::new(&self.config.region, self.config.max_stores);
        let mut log = RunLog::start();
        let total = self.config.queries.len();

        info!(
            fetcher = self.fetcher.name(),
            queries = total,
            max_stores = self.config.max_stores,
            "Starting collection"
        );

        for (i, query) in self.config.queries.iter().enumerate() {
            if state.is_full() {
                info!(stores = state.len(), "Store cap reached, stopping");
                break;
            }

            info!(query = %query, "[{}/{}] Searching", i + 1, total);
            let mut query_log = QueryLog::new(query.as_str());

            if let Err(e) = self.run_query(query, &mut state, &mut query_log).await {
                warn!(query = %query, error = %e, "Query failed");
                log.record_error(query.as_str(), &e);
            }

            log.skipped_no_menu += query_log.skipped;
            log.queries.push(query_log);
        }

        let stores = state.into_stores();
        let total_menus = stores.iter().map(|s| s.menus.len()).sum();
        log.finish(stores.len(), total_menus);

        info!(
            stores = log.total_stores,
            menus = log.total_menus,
            skipped_no_menu = log.skipped_no_menu,
            errors = log.errors.len(),
            "Collection complete"
        );

        CollectOutcome { stores, log }
    }

    async fn run_query(
        &self,
        query: &str,
        state: &mut CollectionState,
        query_log: &mut QueryLog,
    ) -> FetchResult<()> {
        let mut session = self.search_with_retry(query).await?;
        let handles = session.list_results(self.config.max_results).await?;
        query_log.found = handles.len();
        debug!(query = %query, found = handles.len(), "Listed results");

        for handle in &handles {
            if state.is_full() {
                break;
            }

            let extracted = match session.open_detail(handle).await {
                Ok(raw) => self.extractor.extract(&raw),
                Err(e) => {
                    debug!(result = %handle.name, error = %e, "Detail fetch failed");
                    Extracted::default()
                }
            };

            let address = extracted.place.address.clone();
            let menus = self.coffee.filter(extracted.menus);
            let menu_count = menus.len();

            match state.try_accept(extracted.place, menus) {
                Decision::Accepted => {
                    query_log.added += 1;
                    info!(
                        result = %handle.name,
                        menus = menu_count,
                        total = state.len(),
                        "Accepted store"
                    );
                }
                Decision::Rejected(reason) => {
                    if reason == RejectReason::NoCoffeeMenu {
                        query_log.skipped += 1;
                    }
                    debug!(result = %handle.name, address = %address, ?reason, "Rejected place");
                }
            }
        }

        Ok(())
    }

    async fn search_with_retry(&self, query: &str) -> FetchResult<F::Session> {
        let retry = self.config.retry;
        let mut attempt = 0;

        loop {
            match self.fetcher.search(query).await {
                Ok(session) => return Ok(session),
                Err(e) if attempt < retry.max_retries => {
                    attempt += 1;
                    let backoff = retry.backoff_for(attempt);
                    warn!(
                        query = %query,
                        error = %e,
                        "Search failed, retry {}/{} in {:?}",
                        attempt,
                        retry.max_retries,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
