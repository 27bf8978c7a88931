//! Hackathon list and detail actions
//!
//! Invites, emails and problem generation run behind the [`ActionGate`],
//! keyed by hackathon id and action kind. Failures go to the view's
//! [`ErrorSurface`]. A start denied by the gate is shown as a notice and
//! does not count as a failure.

use std::future::Future;
use std::sync::Arc;

use crate::api::HackathonApi;
use crate::config::OutreachConfig;
use crate::error::SyncError;
use crate::gate::{ActionGate, ActionKey, ActionKind};
use crate::liveness::Liveness;
use crate::model::{Hackathon, MergeEntity, ResourceCollection};
use crate::state::Store;
use crate::surface::{ErrorSurface, ALREADY_RUNNING};

pub struct HackathonActions {
    api: Arc<dyn HackathonApi>,
    gate: Arc<ActionGate>,
    errors: ErrorSurface,
    liveness: Liveness,
    outreach: OutreachConfig,
    /// List reloaded after invites are created
    list: Option<(Store<ResourceCollection<Hackathon>>, usize)>,
}

impl HackathonActions {
    pub fn new(api: Arc<dyn HackathonApi>) -> Self {
        Self {
            api,
            gate: Arc::new(ActionGate::new()),
            errors: ErrorSurface::new(),
            liveness: Liveness::new(),
            outreach: OutreachConfig::default(),
            list: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<ActionGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_errors(mut self, errors: ErrorSurface) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_liveness(mut self, liveness: Liveness) -> Self {
        self.liveness = liveness;
        self
    }

    pub fn with_outreach(mut self, outreach: OutreachConfig) -> Self {
        self.outreach = outreach;
        self
    }

    /// Reload `store` with `limit` records after each successful invite
    pub fn refreshing(mut self, store: Store<ResourceCollection<Hackathon>>, limit: usize) -> Self {
        self.list = Some((store, limit));
        self
    }

    pub fn gate(&self) -> &Arc<ActionGate> {
        &self.gate
    }

    async fn guarded<T, Fut>(&self, key: ActionKey, context: &str, action: Fut) -> crate::Result<T>
    where
        Fut: Future<Output = crate::Result<T>>,
    {
        match self.gate.run(&key, action).await {
            Ok(value) => {
                self.liveness.commit(self.errors.record_success()).await;
                Ok(value)
            }
            Err(e @ SyncError::ConcurrencyRejected(_)) => {
                self.liveness.commit(self.errors.notice(ALREADY_RUNNING, &e)).await;
                Err(e)
            }
            Err(e) => {
                self.liveness.commit(self.errors.report(context, &e)).await;
                Err(e)
            }
        }
    }

    /// Create outreach invites; returns how many were created
    pub async fn invite(&self, id: &str) -> crate::Result<u64> {
        let count = self
            .guarded(
                ActionKey::new(id, ActionKind::Invite),
                "Failed to create invites",
                self.api.create_invites(id, self.outreach.invite_limit),
            )
            .await?;
        tracing::info!("Created {} invites for hackathon {}", count, id);

        if let Some((store, limit)) = &self.list {
            if let Err(e) = self.refresh_list(store, *limit).await {
                tracing::debug!("List reload after invites failed: {}", e);
            }
        }
        Ok(count)
    }

    /// Send invite emails; returns how many were attempted
    pub async fn send_emails(&self, id: &str) -> crate::Result<u64> {
        let dry_run = self.outreach.dry_run;
        let count = self
            .guarded(
                ActionKey::new(id, ActionKind::SendEmails),
                "Failed to send emails",
                self.api.send_emails(id, self.outreach.email_limit, dry_run),
            )
            .await?;
        tracing::info!(
            "Sent {} emails for hackathon {} (dry_run={})",
            count,
            id,
            dry_run
        );
        Ok(count)
    }

    /// Generate problem statements and merge the returned hackathon into
    /// `store`
    pub async fn generate_problems<S>(&self, id: &str, store: &Store<S>) -> crate::Result<Hackathon>
    where
        S: MergeEntity<Hackathon> + Send + Sync,
    {
        let updated = self
            .guarded(
                ActionKey::new(id, ActionKind::GenerateProblems),
                "Failed to generate problem statements",
                self.api.generate_problems(id),
            )
            .await?;

        self.liveness
            .commit(async {
                let merged = store
                    .write()
                    .await
                    .update_if(|value| value.merge(updated.clone()));
                if !merged {
                    tracing::debug!("Hackathon {} not held by this view", id);
                }
            })
            .await;
        Ok(updated)
    }

    /// Load one hackathon into a detail store
    pub async fn load(&self, id: &str, store: &Store<Option<Hackathon>>) -> crate::Result<Hackathon> {
        match self.api.get_hackathon(id).await {
            Ok(hackathon) => {
                self.liveness
                    .commit(async {
                        store.write().await.replace(Some(hackathon.clone()));
                        self.errors.record_success().await;
                    })
                    .await;
                Ok(hackathon)
            }
            Err(e) => {
                self.liveness
                    .commit(self.errors.report("Failed to load hackathon", &e))
                    .await;
                Err(e)
            }
        }
    }

    /// Replace `store` with the first `limit` hackathons
    pub async fn refresh_list(
        &self,
        store: &Store<ResourceCollection<Hackathon>>,
        limit: usize,
    ) -> crate::Result<()> {
        match self.api.list_hackathons(limit).await {
            Ok(hackathons) => {
                self.liveness
                    .commit(async {
                        store.write().await.replace(hackathons);
                        self.errors.record_success().await;
                    })
                    .await;
                Ok(())
            }
            Err(e) => {
                self.liveness
                    .commit(self.errors.report("Failed to load", &e))
                    .await;
                Err(e)
            }
        }
    }
}
