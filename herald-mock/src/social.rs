use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use herald_core::{
    HeraldError, PostSearchPage, SearchQuery, SocialSearchProvider, UpstreamResponse,
};

use crate::fixtures;

/// Instruction for how a single `search_recent` call behaves.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value.
    Return(T),
    /// Fail with the provided error.
    Fail(HeraldError),
    /// Never complete.
    Hang,
}

/// Scripted social search provider.
///
/// Queued behaviors are consumed one per call; once the queue is empty the
/// fallback applies (by default the fixture page for any query).
#[derive(Debug)]
pub struct MockSocialProvider {
    script: Mutex<VecDeque<MockBehavior<UpstreamResponse<PostSearchPage>>>>,
    fallback: Mutex<MockBehavior<UpstreamResponse<PostSearchPage>>>,
    queries: Mutex<Vec<SearchQuery>>,
    calls: AtomicUsize,
    operational: AtomicBool,
    latency: Duration,
}

impl Default for MockSocialProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockSocialProvider {
    /// Operational provider answering every query with [`fixtures::posts::conference_page`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(MockBehavior::Return(UpstreamResponse::new(
                fixtures::posts::conference_page(),
            ))),
            queries: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            operational: AtomicBool::new(true),
            latency: Duration::ZERO,
        }
    }

    /// Provider that reports itself as not operational.
    #[must_use]
    pub fn not_operational() -> Self {
        let provider = Self::new();
        provider.set_operational(false);
        provider
    }

    /// Sleep this long (tokio time) before answering each call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a behavior for the next unscripted call.
    pub fn push(&self, behavior: MockBehavior<UpstreamResponse<PostSearchPage>>) {
        lock(&self.script).push_back(behavior);
    }

    /// Queue a failure for the next unscripted call.
    pub fn push_failure(&self, error: HeraldError) {
        self.push(MockBehavior::Fail(error));
    }

    /// Behavior once the script is exhausted.
    pub fn set_fallback(&self, behavior: MockBehavior<UpstreamResponse<PostSearchPage>>) {
        *lock(&self.fallback) = behavior;
    }

    /// Toggle the operational flag.
    pub fn set_operational(&self, operational: bool) {
        self.operational.store(operational, Ordering::SeqCst);
    }

    /// Number of `search_recent` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received, in call order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl SocialSearchProvider for MockSocialProvider {
    fn name(&self) -> &'static str {
        "herald-mock-social"
    }

    fn is_operational(&self) -> bool {
        self.operational.load(Ordering::SeqCst)
    }

    async fn search_recent(
        &self,
        query: &SearchQuery,
    ) -> Result<UpstreamResponse<PostSearchPage>, HeraldError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.queries).push(query.clone());
        let behavior = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| lock(&self.fallback).clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match behavior {
            MockBehavior::Return(response) => Ok(response),
            MockBehavior::Fail(error) => Err(error),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}
