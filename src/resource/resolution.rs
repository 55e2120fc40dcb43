//! Async Resolvable Resource
//!
//! Every remote resource (server, catalog, data product) carries one
//! [`ResolutionState`] and implements [`AsyncResource::fetch_and_merge`].
//! The trait's provided [`AsyncResource::resolve`] drives the lifecycle:
//!
//! ```text
//! UNRESOLVED --resolve()--> RESOLVING --ok--> RESOLVED
//!                               |
//!                               +--err--> UNRESOLVED (may be retried)
//! ```
//!
//! # Listener contract
//!
//! Listeners registered with [`AsyncResource::register_resolution_listener`]
//! fire once, last-registered-first, on the transition to resolved, and are
//! then discarded. A listener registered after the resource has resolved is
//! never fired: register before calling `resolve()`, or check
//! [`AsyncResource::is_resolved`] first.
//!
//! # Overlapping attempts
//!
//! Under [`ResolutionPolicy::Concurrent`] overlapping `resolve()` calls are
//! neither prevented nor coalesced. Each issues its own fetch and merges its
//! own response, so the last response to arrive wins, and a listener
//! registered between two completions fires for the second one.
//! [`ResolutionPolicy::SingleFlight`] joins every caller onto the attempt
//! already in flight and hands each of them its result.

use crate::error::Result;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Callback fired once when a resource finishes resolving
pub type ResolutionListener = Box<dyn FnOnce() + Send + 'static>;

type InFlight = Shared<BoxFuture<'static, Result<()>>>;

/// How overlapping `resolve()` calls on one resource behave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// Every call issues its own fetch; completions race
    #[default]
    Concurrent,
    /// Calls made while an attempt is in flight share that attempt's result
    SingleFlight,
}

/// Resolution bookkeeping owned by each resource instance
pub struct ResolutionState {
    resolved: AtomicBool,
    resolving: AtomicBool,
    listeners: Mutex<Vec<ResolutionListener>>,
    policy: ResolutionPolicy,
    in_flight: Mutex<Option<InFlight>>,
}

impl ResolutionState {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self {
            resolved: AtomicBool::new(false),
            resolving: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
            policy,
            in_flight: Mutex::new(None),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving.load(Ordering::SeqCst)
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// Number of listeners still waiting for resolution
    pub fn pending_listeners(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn register_listener(&self, listener: ResolutionListener) {
        lock(&self.listeners).push(listener);
    }

    /// Setting `true` drains and fires every pending listener
    pub(crate) fn set_resolved(&self, resolved: bool) {
        self.resolved.store(resolved, Ordering::SeqCst);
        if !resolved {
            return;
        }

        let listeners = std::mem::take(&mut *lock(&self.listeners));
        tracing::debug!("Resolved, notifying {} listener(s)", listeners.len());
        for listener in listeners.into_iter().rev() {
            listener();
        }
    }

    pub(crate) fn set_resolving(&self, resolving: bool) {
        self.resolving.store(resolving, Ordering::SeqCst);
    }

    /// Join the attempt in flight, or start one with `start`
    fn join_or_start<F>(&self, start: F) -> InFlight
    where
        F: FnOnce() -> BoxFuture<'static, Result<()>>,
    {
        let mut slot = lock(&self.in_flight);
        if let Some(attempt) = slot.as_ref() {
            tracing::debug!("Joining resolution already in flight");
            return attempt.clone();
        }

        let attempt = start().shared();
        *slot = Some(attempt.clone());
        attempt
    }

    fn clear_in_flight(&self) {
        lock(&self.in_flight).take();
    }
}

impl Default for ResolutionState {
    fn default() -> Self {
        Self::new(ResolutionPolicy::default())
    }
}

impl std::fmt::Debug for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionState")
            .field("resolved", &self.is_resolved())
            .field("resolving", &self.is_resolving())
            .field("pending_listeners", &self.pending_listeners())
            .field("policy", &self.policy)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A remote resource with a resolution lifecycle
///
/// Implementors supply the state object, the canonical detail URL and
/// [`fetch_and_merge`](AsyncResource::fetch_and_merge); the lifecycle itself
/// is provided.
#[async_trait]
pub trait AsyncResource: Clone + Send + Sync + 'static {
    /// The state object this resource owns
    fn resolution(&self) -> &ResolutionState;

    /// Canonical detail endpoint fetched on resolution
    fn detail_url(&self) -> String;

    /// Issue exactly one fetch of [`detail_url`](AsyncResource::detail_url)
    /// and copy the decoded fields onto this resource
    async fn fetch_and_merge(&self) -> Result<()>;

    fn is_resolved(&self) -> bool {
        self.resolution().is_resolved()
    }

    fn is_resolving(&self) -> bool {
        self.resolution().is_resolving()
    }

    /// Fire `listener` once when this resource next becomes resolved
    ///
    /// Not replayed: registering after resolution has completed never fires.
    fn register_resolution_listener<F>(&self, listener: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.resolution().register_listener(Box::new(listener));
    }

    /// Fetch this resource and merge the response into it
    ///
    /// Transport, status and decode errors are returned to the caller and
    /// leave [`is_resolved`](AsyncResource::is_resolved) untouched.
    async fn resolve(&self) -> Result<()> {
        match self.resolution().policy() {
            ResolutionPolicy::Concurrent => resolve_once(self).await,
            ResolutionPolicy::SingleFlight => {
                let attempt = self.resolution().join_or_start(|| {
                    let this = self.clone();
                    async move {
                        let result = resolve_once(&this).await;
                        this.resolution().clear_in_flight();
                        result
                    }
                    .boxed()
                });
                attempt.await
            }
        }
    }
}

/// One resolution attempt
async fn resolve_once<R: AsyncResource>(resource: &R) -> Result<()> {
    let state = resource.resolution();
    state.set_resolving(true);

    let result = resource.fetch_and_merge().await;
    if result.is_ok() {
        state.set_resolved(true);
    }

    state.set_resolving(false);
    result
}

/// Start resolving `resource` in the background
///
/// Used by constructors that resolve eagerly. The caller is not told about
/// failures; they are logged. Without a running tokio runtime nothing is
/// spawned and a warning is logged instead.
pub fn spawn_resolution<R: AsyncResource>(resource: &R) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(
            "No async runtime, skipping automatic resolution of {}",
            resource.detail_url()
        );
        return;
    };

    let resource = resource.clone();
    handle.spawn(async move {
        if let Err(e) = resource.resolve().await {
            tracing::error!("Failed to resolve {}: {}", resource.detail_url(), e);
        }
    });
}
