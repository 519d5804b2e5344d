//! Resource binding: async fetch adapted to renderable view state
//!
//! A [`Resource`] owns the three observable pieces a view needs from an
//! asynchronous data source (`body`, `is_loading`, `error`) plus an
//! imperative `refresh()`. Each logical view holds its own binding;
//! there is no process-wide registry.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{ConsoleError, Result};

type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;
type FetchFn<T, D> = dyn Fn(D) -> FetchFuture<T> + Send + Sync;

/// Point-in-time view of a binding, cheap to hand to a renderer.
///
/// Loading, empty-result and error states are all distinguishable:
/// `is_loading` is independent of `body`, and a captured `error` stays
/// visible until the next refresh clears it.
#[derive(Debug, Clone)]
pub struct ResourceState<T> {
    pub body: T,
    pub is_loading: bool,
    pub error: Option<ConsoleError>,
}

struct Cell<T> {
    body: T,
    is_loading: bool,
    error: Option<ConsoleError>,
}

struct Inner<T, D> {
    cell: Mutex<Cell<T>>,
    deps: Mutex<D>,
    default_body: T,
    fetch: Box<FetchFn<T, D>>,
    /// Sequence number of the most recently *started* refresh. A
    /// completion whose number is older is discarded so a slow stale
    /// response can never overwrite a fresher one.
    started: AtomicU64,
}

/// Binding from a no-argument-per-call async fetch to view state.
///
/// The fetch receives the binding's current dependency value; changing
/// the dependency with [`Resource::set_deps`] resets the body to the
/// default and refetches. Handles are cheap clones sharing one state
/// cell.
pub struct Resource<T, D = ()> {
    inner: Arc<Inner<T, D>>,
}

impl<T, D> Clone for Resource<T, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, D> Resource<T, D>
where
    T: Clone + Send + 'static,
    D: Clone + Send + 'static,
{
    /// Create the binding and perform the mount-time refresh.
    pub async fn bind<F, Fut>(deps: D, default_body: T, fetch: F) -> Self
    where
        F: Fn(D) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let resource = Self::new(deps, default_body, fetch);
        resource.refresh().await;
        resource
    }

    /// Create the binding without refreshing. Mainly useful in tests;
    /// views want [`Resource::bind`].
    pub fn new<F, Fut>(deps: D, default_body: T, fetch: F) -> Self
    where
        F: Fn(D) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                cell: Mutex::new(Cell {
                    body: default_body.clone(),
                    is_loading: false,
                    error: None,
                }),
                deps: Mutex::new(deps),
                default_body,
                fetch: Box::new(move |deps| {
                    let fut: FetchFuture<T> = Box::pin(fetch(deps));
                    fut
                }),
                started: AtomicU64::new(0),
            }),
        }
    }

    /// Run the fetch and apply its outcome.
    ///
    /// Marks the binding loading and clears the previous error, then
    /// awaits the fetch. Success replaces `body`; failure records the
    /// error; both paths resolve `is_loading` back to `false`. If a
    /// newer refresh started while this one was in flight, the stale
    /// outcome is dropped without touching the state at all.
    pub async fn refresh(&self) {
        let seq = self.inner.started.fetch_add(1, Ordering::SeqCst) + 1;
        let deps = self.inner.deps.lock().clone();
        {
            let mut cell = self.inner.cell.lock();
            cell.is_loading = true;
            cell.error = None;
        }

        let outcome = (self.inner.fetch)(deps).await;

        let mut cell = self.inner.cell.lock();
        if self.inner.started.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding superseded refresh result");
            return;
        }
        match outcome {
            Ok(body) => {
                cell.body = body;
            }
            Err(e) => {
                debug!(error = %e, "refresh failed");
                cell.error = Some(e);
            }
        }
        cell.is_loading = false;
    }

    /// Replace the dependency value.
    ///
    /// Equal values are a no-op. A changed value resets the body to the
    /// default (explicit clear-then-reload) and refreshes.
    pub async fn set_deps(&self, new_deps: D)
    where
        D: PartialEq,
    {
        {
            let mut deps = self.inner.deps.lock();
            if *deps == new_deps {
                return;
            }
            *deps = new_deps;
        }
        {
            let mut cell = self.inner.cell.lock();
            cell.body = self.inner.default_body.clone();
        }
        self.refresh().await;
    }

    /// Current dependency value.
    pub fn deps(&self) -> D {
        self.inner.deps.lock().clone()
    }

    /// Snapshot of the observable state.
    pub fn snapshot(&self) -> ResourceState<T> {
        let cell = self.inner.cell.lock();
        ResourceState {
            body: cell.body.clone(),
            is_loading: cell.is_loading,
            error: cell.error.clone(),
        }
    }

    /// Current body without the loading/error flags.
    pub fn body(&self) -> T {
        self.inner.cell.lock().body.clone()
    }
}
