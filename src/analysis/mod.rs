//! Brand-analysis requests with a per-session result cache.
//!
//! Analyses are fetched on the runtime in a background task. The cache keeps
//! one entry per brand for the current search session: `Pending` while the
//! request is in flight, then `Ready` or `Failed`. A `Failed` entry is
//! retried on the next request; only `cancel` or a session `reset` discards
//! in-flight work.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::models::BrandAnalysisRequest;
use crate::api::PharmaApi;

/// Lifecycle of one brand's analysis. Absence from the cache is the fourth
/// state: never requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    /// Request spawned, no result yet.
    Pending,
    /// Analysis text as returned by the backend.
    Ready(String),
    /// The request settled without an analysis.
    Failed(String),
}

impl AnalysisState {
    /// Whether the request is still in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The analysis text, when ready.
    pub fn analysis(&self) -> Option<&str> {
        match self {
            Self::Ready(text) => Some(text),
            _ => None,
        }
    }

    /// The failure reason, when failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

struct Entry {
    state: AnalysisState,
    settled: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

struct Inner {
    session: u64,
    entries: HashMap<String, Entry>,
}

/// Brand-analysis cache bound to one search session at a time.
pub struct AnalysisCache {
    api: Arc<dyn PharmaApi>,
    inner: Arc<Mutex<Inner>>,
}

impl AnalysisCache {
    /// Creates an empty cache backed by `api`.
    pub fn new(api: Arc<dyn PharmaApi>) -> Self {
        Self { api, inner: Arc::new(Mutex::new(Inner { session: 0, entries: HashMap::new() })) }
    }

    /// Arranges an analysis for `request.brand` and returns the state after
    /// doing so. A brand that is already pending gets no second network call;
    /// a cached `Ready` entry is returned as-is unless `force` is set. A
    /// `Failed` entry always retries.
    pub async fn request(&self, request: BrandAnalysisRequest, force: bool) -> AnalysisState {
        let mut guard = self.inner.lock().await;

        if let Some(entry) = guard.entries.get(&request.brand) {
            match &entry.state {
                AnalysisState::Pending => {
                    debug!("Analysis for {} already pending", request.brand);
                    return AnalysisState::Pending;
                }
                AnalysisState::Ready(text) if !force => {
                    debug!("Analysis for {} served from cache", request.brand);
                    return AnalysisState::Ready(text.clone());
                }
                _ => {}
            }
        }

        let session = guard.session;
        let brand = request.brand.clone();
        let (settled, _) = watch::channel(false);

        let api = Arc::clone(&self.api);
        let inner = Arc::clone(&self.inner);
        let task_brand = brand.clone();
        // Spawned while the lock is held, so the entry is in place before the
        // task can write back.
        let task = tokio::spawn(async move {
            let outcome = match api.brand_analysis(&request).await {
                Ok(response) if response.success => match response.analysis {
                    Some(text) => AnalysisState::Ready(text),
                    None => AnalysisState::Failed("Analysis text missing from response".to_string()),
                },
                Ok(response) => AnalysisState::Failed(
                    response.error.unwrap_or_else(|| "Analysis request refused".to_string()),
                ),
                Err(err) => AnalysisState::Failed(err.to_string()),
            };

            let mut guard = inner.lock().await;
            if guard.session != session {
                debug!("Discarding analysis for {} from a finished session", task_brand);
                return;
            }
            if let Some(entry) = guard.entries.get_mut(&task_brand) {
                if let AnalysisState::Failed(reason) = &outcome {
                    warn!("Analysis for {} failed: {}", task_brand, reason);
                }
                entry.state = outcome;
                entry.task = None;
                let _ = entry.settled.send(true);
            }
        });

        guard
            .entries
            .insert(brand, Entry { state: AnalysisState::Pending, settled, task: Some(task) });

        AnalysisState::Pending
    }

    /// Current state for `brand`, or `None` when never requested this session.
    pub async fn state(&self, brand: &str) -> Option<AnalysisState> {
        let guard = self.inner.lock().await;
        guard.entries.get(brand).map(|entry| entry.state.clone())
    }

    /// Awaits the in-flight request for `brand` and returns the settled
    /// state. Returns `None` when nothing was requested or the request was
    /// cancelled while waiting.
    pub async fn wait(&self, brand: &str) -> Option<AnalysisState> {
        let mut rx = {
            let guard = self.inner.lock().await;
            let entry = guard.entries.get(brand)?;
            if !entry.state.is_pending() {
                return Some(entry.state.clone());
            }
            entry.settled.subscribe()
        };

        // A dropped sender means the entry was cancelled or reset away.
        if rx.changed().await.is_err() {
            return None;
        }

        let guard = self.inner.lock().await;
        guard.entries.get(brand).map(|entry| entry.state.clone())
    }

    /// Requests an analysis and waits for it to settle.
    pub async fn fetch(&self, request: BrandAnalysisRequest, force: bool) -> AnalysisState {
        let brand = request.brand.clone();
        if let AnalysisState::Ready(text) = self.request(request, force).await {
            return AnalysisState::Ready(text);
        }
        self.wait(&brand)
            .await
            .unwrap_or_else(|| AnalysisState::Failed("Analysis cancelled".to_string()))
    }

    /// Aborts the in-flight request for `brand` and forgets it. Settled
    /// entries are left cached. Returns whether anything was cancelled.
    pub async fn cancel(&self, brand: &str) -> bool {
        let mut guard = self.inner.lock().await;

        let pending =
            guard.entries.get(brand).is_some_and(|entry| entry.state.is_pending());
        if !pending {
            return false;
        }

        if let Some(entry) = guard.entries.remove(brand) {
            if let Some(task) = entry.task {
                task.abort();
            }
        }
        debug!("Cancelled analysis for {}", brand);
        true
    }

    /// Drops every entry, aborts in-flight work and rebinds the cache to
    /// `session`. A late result from the old session can no longer be
    /// written back.
    pub async fn reset(&self, session: u64) {
        let mut guard = self.inner.lock().await;
        for (_, entry) in guard.entries.drain() {
            if let Some(task) = entry.task {
                task.abort();
            }
        }
        guard.session = session;
    }

    /// The session the cache is currently bound to.
    pub async fn session(&self) -> u64 {
        self.inner.lock().await.session
    }
}
