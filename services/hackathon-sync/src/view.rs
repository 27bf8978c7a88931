//! Per-view ownership of liveness, errors, gate and poll sessions

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::actions::HackathonActions;
use crate::aggregator::{Aggregator, DashboardSnapshot};
use crate::api::HackathonApi;
use crate::config::OutreachConfig;
use crate::draft::DraftSubmitter;
use crate::error::SyncError;
use crate::gate::ActionGate;
use crate::liveness::Liveness;
use crate::model::{Hackathon, HackathonDraft, ResourceCollection};
use crate::poller::{PollSession, PollStats, Poller};
use crate::state::Store;
use crate::surface::ErrorSurface;

/// Everything a mounted view owns. [`ViewScope::unmount`] tears it all
/// down; results of requests still in flight are dropped.
pub struct ViewScope {
    name: String,
    liveness: Liveness,
    errors: ErrorSurface,
    gate: Arc<ActionGate>,
    sessions: Mutex<Vec<PollSession>>,
}

impl ViewScope {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!("Mounting view '{}'", name);
        Self {
            name,
            liveness: Liveness::new(),
            errors: ErrorSurface::new(),
            gate: Arc::new(ActionGate::new()),
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mounted(&self) -> bool {
        self.liveness.is_live()
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn errors(&self) -> &ErrorSurface {
        &self.errors
    }

    pub fn gate(&self) -> &Arc<ActionGate> {
        &self.gate
    }

    /// Start polling into `store`; the session stops on unmount
    pub async fn poll<T, F, Fut>(
        &self,
        interval: Duration,
        store: Store<T>,
        context: &str,
        fetch: F,
    ) -> crate::Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<T>> + Send + 'static,
    {
        let mut sessions = self.sessions.lock().await;
        if !self.is_mounted() {
            return Err(SyncError::Config(format!(
                "view '{}' is unmounted",
                self.name
            )));
        }
        let session = Poller::new(interval, store)
            .with_parent(&self.liveness)
            .with_errors(self.errors.clone())
            .with_context(context)
            .start(fetch)?;
        sessions.push(session);
        Ok(())
    }

    /// One aggregate dashboard load, committed only while mounted
    pub async fn load_dashboard(
        &self,
        aggregator: &Aggregator,
        limit: usize,
        store: &Store<DashboardSnapshot>,
    ) -> bool {
        aggregator
            .refresh_into(limit, store, &self.liveness, &self.errors)
            .await
    }

    /// List and detail actions reporting into this view
    pub fn actions(&self, api: Arc<dyn HackathonApi>, outreach: OutreachConfig) -> HackathonActions {
        HackathonActions::new(api)
            .with_gate(Arc::clone(&self.gate))
            .with_errors(self.errors.clone())
            .with_liveness(self.liveness.clone())
            .with_outreach(outreach)
    }

    /// The "Create Hackathon" form of this view
    pub fn hackathon_form(
        &self,
        api: Arc<dyn HackathonApi>,
        collection: Store<ResourceCollection<Hackathon>>,
    ) -> DraftSubmitter<HackathonDraft> {
        DraftSubmitter::for_hackathons(api, collection)
            .with_gate(Arc::clone(&self.gate))
            .with_errors(self.errors.clone())
            .with_liveness(self.liveness.clone())
    }

    pub async fn poll_stats(&self) -> Vec<PollStats> {
        self.sessions
            .lock()
            .await
            .iter()
            .map(PollSession::stats)
            .collect()
    }

    /// Stop every session, mark in-flight work stale and drop action
    /// records. Idempotent.
    pub async fn unmount(&self) {
        let sessions = std::mem::take(&mut *self.sessions.lock().await);
        for session in &sessions {
            session.stop().await;
        }
        self.liveness.revoke().await;
        self.gate.clear().await;
        tracing::debug!(
            "Unmounted view '{}' ({} poll sessions stopped)",
            self.name,
            sessions.len()
        );
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.liveness.revoke_now();
    }
}
