//! Poller: periodic fetch with clean cancellation
//!
//! A session fetches once immediately, then once per interval. A tick that
//! comes due while the previous fetch is still pending is skipped. Results
//! are committed through the session's [`Liveness`], so nothing lands in the
//! store after [`PollSession::stop`] returns.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::SyncError;
use crate::liveness::Liveness;
use crate::state::Store;
use crate::surface::ErrorSurface;

/// Error context used when a session has none of its own
pub const DEFAULT_CONTEXT: &str = "Failed to load";

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    pub started: u64,
    pub skipped: u64,
    pub failed: u64,
    pub applied: u64,
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    started: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    applied: AtomicU64,
    discarded: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> PollStats {
        PollStats {
            started: self.started.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// State shared by the ticker and the fetch tasks it spawns
struct Session<T> {
    store: Store<T>,
    errors: ErrorSurface,
    liveness: Liveness,
    context: String,
    in_flight: AtomicBool,
    counters: Arc<Counters>,
}

impl<T> Session<T> {
    async fn settle(&self, result: crate::Result<T>) {
        match result {
            Ok(value) => {
                let applied = self
                    .liveness
                    .commit(async {
                        self.store.write().await.replace(value);
                        self.errors.record_success().await;
                    })
                    .await;
                if applied.is_some() {
                    self.counters.applied.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.discard();
                }
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                let reported = self
                    .liveness
                    .commit(self.errors.report(&self.context, &e))
                    .await;
                if reported.is_none() {
                    self.discard();
                }
            }
        }
    }

    fn discard(&self) {
        self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Poll result for '{}' discarded after stop", self.context);
    }
}

/// Builder for a polling session writing into one store
pub struct Poller<T> {
    interval: Duration,
    store: Store<T>,
    errors: ErrorSurface,
    liveness: Liveness,
    context: String,
}

impl<T: Send + Sync + 'static> Poller<T> {
    pub fn new(interval: Duration, store: Store<T>) -> Self {
        Self {
            interval,
            store,
            errors: ErrorSurface::new(),
            liveness: Liveness::new(),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    /// Report failures to `errors` instead of a private surface
    pub fn with_errors(mut self, errors: ErrorSurface) -> Self {
        self.errors = errors;
        self
    }

    /// Tie the session to `parent`: revoking the parent stops the session
    pub fn with_parent(mut self, parent: &Liveness) -> Self {
        self.liveness = parent.child();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Spawn the schedule. Must be called inside a tokio runtime.
    pub fn start<F, Fut>(self, fetch: F) -> crate::Result<PollSession>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<T>> + Send + 'static,
    {
        if self.interval.is_zero() {
            return Err(SyncError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let liveness = self.liveness.clone();
        let counters = Arc::new(Counters::default());
        let session = Arc::new(Session {
            store: self.store,
            errors: self.errors,
            liveness: self.liveness,
            context: self.context,
            in_flight: AtomicBool::new(false),
            counters: Arc::clone(&counters),
        });

        tracing::debug!(
            "Starting poll session '{}' every {:?}",
            session.context,
            self.interval
        );
        let ticker = tokio::spawn(run_schedule(self.interval, fetch, session));

        Ok(PollSession {
            liveness,
            ticker: Mutex::new(Some(ticker)),
            counters,
        })
    }
}

async fn run_schedule<T, F, Fut>(interval: Duration, fetch: F, session: Arc<Session<T>>)
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<T>> + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = session.liveness.revoked() => break,
            _ = ticker.tick() => {}
        }

        if session.in_flight.swap(true, Ordering::AcqRel) {
            session.counters.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Poll tick for '{}' skipped, fetch pending", session.context);
            continue;
        }

        let Some(request) = session.liveness.invoke(&fetch).await else {
            session.in_flight.store(false, Ordering::Release);
            break;
        };
        session.counters.started.fetch_add(1, Ordering::Relaxed);

        let session = Arc::clone(&session);
        tokio::spawn(async move {
            let _in_flight = InFlight(&session.in_flight);
            let result = match AssertUnwindSafe(request).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(SyncError::Panicked(panic_message(panic.as_ref()))),
            };
            session.settle(result).await;
        });
    }

    tracing::debug!("Poll session '{}' stopped", session.context);
}

/// Clears the pending flag when a fetch task ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Handle to a running schedule
pub struct PollSession {
    liveness: Liveness,
    ticker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for PollSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollSession")
            .field("active", &self.is_active())
            .field("stats", &self.stats())
            .finish()
    }
}

impl PollSession {
    /// Stop the schedule. Idempotent. Once this returns, no result of an
    /// earlier fetch reaches the store and the fetch function is not
    /// called again.
    pub async fn stop(&self) {
        self.liveness.revoke().await;
        let ticker = self.ticker.lock().await.take();
        if let Some(ticker) = ticker {
            if let Err(e) = ticker.await {
                tracing::warn!("Poll ticker ended abnormally: {}", e);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.liveness.is_live()
    }

    pub fn stats(&self) -> PollStats {
        self.counters.snapshot()
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.liveness.revoke_now();
    }
}
