//! Cancellation with check-then-commit
//!
//! A [`Liveness`] wraps a [`CancellationToken`] together with a commit lock.
//! Revoking takes the lock, so once [`Liveness::revoke`] returns no
//! [`Liveness::commit`] or [`Liveness::invoke`] can run for it or any child.
//! Requests already in flight are not aborted; their results are dropped
//! at commit time.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct Liveness {
    token: CancellationToken,
    gate: Arc<Mutex<()>>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// A liveness revoked together with `self`, or on its own.
    /// Parent and children share one commit lock.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            gate: Arc::clone(&self.gate),
        }
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Mark stale. Waits for a commit in progress to finish.
    pub async fn revoke(&self) {
        let _guard = self.gate.lock().await;
        self.token.cancel();
    }

    /// Revoke without waiting for the commit lock
    pub fn revoke_now(&self) {
        self.token.cancel();
    }

    /// Run `apply` only while live. Returns `None` when stale.
    pub async fn commit<F, R>(&self, apply: F) -> Option<R>
    where
        F: Future<Output = R>,
    {
        let _guard = self.gate.lock().await;
        if self.token.is_cancelled() {
            return None;
        }
        Some(apply.await)
    }

    /// Call `start` only while live; used to begin a request
    pub async fn invoke<F, R>(&self, start: F) -> Option<R>
    where
        F: FnOnce() -> R,
    {
        let _guard = self.gate.lock().await;
        if self.token.is_cancelled() {
            return None;
        }
        Some(start())
    }

    /// Resolves once revoked
    pub async fn revoked(&self) {
        self.token.cancelled().await;
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
