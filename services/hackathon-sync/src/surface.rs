//! View-local error slot
//!
//! Components catch failures at their boundary and report them here with an
//! operation context such as "Failed to load". The latest error stays until
//! the next successful operation or an explicit dismiss.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{ErrorKind, SyncError};
use crate::state::current_epoch_ms;

/// Consecutive failures after which a warning is logged
pub const FAILURE_WARN_THRESHOLD: u32 = 5;

/// Context of the message shown when a start is refused by the action gate
pub const ALREADY_RUNNING: &str = "Action already running";

/// A failure as presented to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub context: String,
    pub message: String,
    pub kind: ErrorKind,
    pub at_epoch_ms: u64,
}

impl ErrorReport {
    /// "context: message", the line a view would render
    pub fn display(&self) -> String {
        format!("{}: {}", self.context, self.message)
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    current: Option<ErrorReport>,
    consecutive_failures: u32,
    total_failures: u64,
}

/// Cloneable handle to one view's error slot
#[derive(Debug, Clone, Default)]
pub struct ErrorSurface {
    inner: Arc<RwLock<SurfaceState>>,
}

impl ErrorSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn report(&self, context: &str, error: &SyncError) {
        let mut state = self.inner.write().await;
        state.consecutive_failures += 1;
        state.total_failures += 1;
        if state.consecutive_failures == FAILURE_WARN_THRESHOLD {
            tracing::warn!(
                "{} consecutive failures, latest: {}: {}",
                state.consecutive_failures,
                context,
                error
            );
        } else {
            tracing::debug!("{}: {}", context, error);
        }
        state.current = Some(ErrorReport {
            context: context.to_string(),
            message: error.to_string(),
            kind: error.kind(),
            at_epoch_ms: current_epoch_ms(),
        });
    }

    /// Show `error` without counting it as a failure. Used for refused
    /// starts, which say nothing about the health of the API.
    pub async fn notice(&self, context: &str, error: &SyncError) {
        tracing::debug!("{}: {}", context, error);
        self.inner.write().await.current = Some(ErrorReport {
            context: context.to_string(),
            message: error.to_string(),
            kind: error.kind(),
            at_epoch_ms: current_epoch_ms(),
        });
    }

    /// A successful operation clears the slot
    pub async fn record_success(&self) {
        let mut state = self.inner.write().await;
        state.consecutive_failures = 0;
        state.current = None;
    }

    /// User dismissed the message; failure counts are kept
    pub async fn dismiss(&self) {
        self.inner.write().await.current = None;
    }

    pub async fn current(&self) -> Option<ErrorReport> {
        self.inner.read().await.current.clone()
    }

    pub async fn consecutive_failures(&self) -> u32 {
        self.inner.read().await.consecutive_failures
    }

    pub async fn total_failures(&self) -> u64 {
        self.inner.read().await.total_failures
    }
}
