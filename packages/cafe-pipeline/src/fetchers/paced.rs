//! Paced fetcher wrapper.
//!
//! Wraps any PageFetcher so searches and detail fetches are spaced out with
//! a minimum interval plus random jitter, using the governor crate. This
//! keeps request volume polite towards the map service.

use async_trait::async_trait;
use governor::{Jitter, Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchResult;
use crate::traits::fetcher::{PageFetcher, ResultHandle, SearchSession};
use crate::types::config::PacingConfig;
use crate::types::state::RawState;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// One pause policy: at least `interval` between permits, plus jitter.
///
/// A zero interval disables the pause entirely.
#[derive(Clone)]
pub struct Pacer {
    limiter: Option<Arc<DefaultRateLimiter>>,
    jitter: Duration,
}

impl Pacer {
    pub fn new(interval: Duration, jitter: Duration) -> Self {
        Self {
            limiter: Quota::with_period(interval).map(|q| Arc::new(RateLimiter::direct(q))),
            jitter,
        }
    }

    pub fn from_millis(interval_ms: u64, jitter_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(jitter_ms),
        )
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Wait until the next permit is available.
    pub async fn pause(&self) {
        if let Some(limiter) = &self.limiter {
            limiter
                .until_ready_with_jitter(Jitter::up_to(self.jitter))
                .await;
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// A fetcher wrapper that paces searches and detail fetches.
pub struct PacedFetcher<F: PageFetcher> {
    inner: F,
    between_queries: Pacer,
    after_fetch: Pacer,
}

impl<F: PageFetcher> PacedFetcher<F> {
    pub fn new(fetcher: F, config: &PacingConfig) -> Self {
        Self {
            inner: fetcher,
            between_queries: Pacer::from_millis(
                config.between_queries_ms,
                config.between_queries_jitter_ms,
            ),
            after_fetch: Pacer::from_millis(config.after_fetch_ms, config.after_fetch_jitter_ms),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

/// Session handed out by [`PacedFetcher`].
pub struct PacedSession<S: SearchSession> {
    inner: S,
    after_fetch: Pacer,
}

#[async_trait]
impl<S: SearchSession> SearchSession for PacedSession<S> {
    async fn list_results(&mut self, max: usize) -> FetchResult<Vec<ResultHandle>> {
        self.inner.list_results(max).await
    }

    async fn open_detail(&mut self, handle: &ResultHandle) -> FetchResult<RawState> {
        self.after_fetch.pause().await;
        self.inner.open_detail(handle).await
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for PacedFetcher<F> {
    type Session = PacedSession<F::Session>;

    async fn search(&self, query: &str) -> FetchResult<Self::Session> {
        self.between_queries.pause().await;
        let inner = self.inner.search(query).await?;

        Ok(PacedSession {
            inner,
            after_fetch: self.after_fetch.clone(),
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Extension trait for easy pacing.
pub trait FetcherExt: PageFetcher + Sized {
    /// Wrap this fetcher with politeness delays.
    fn paced(self, config: &PacingConfig) -> PacedFetcher<Self> {
        PacedFetcher::new(self, config)
    }
}

impl<F: PageFetcher + Sized> FetcherExt for F {}
