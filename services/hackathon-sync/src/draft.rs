//! Draft submission with optimistic merge
//!
//! A valid draft is sent to its creation endpoint; the created entity is
//! prepended to the collection the view shows. There is no reconciling
//! refetch, so the collection is only eventually consistent with the server.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::api::HackathonApi;
use crate::error::SyncError;
use crate::gate::{ActionGate, ActionKey, ActionKind};
use crate::liveness::Liveness;
use crate::model::{Hackathon, HackathonDraft, Record, ResourceCollection};
use crate::state::Store;
use crate::surface::{ErrorSurface, ALREADY_RUNNING};

/// Entity id used for the gate key of a form that has no entity yet
pub const DRAFT_ENTITY: &str = "draft";

/// Form input that creates an entity
pub trait Draft: Clone + Default + Send + Sync + 'static {
    type Entity: Record + Clone + Send + Sync + 'static;

    /// Reject blank required fields
    fn validate(&self) -> crate::Result<()>;
}

impl Draft for HackathonDraft {
    type Entity = Hackathon;

    fn validate(&self) -> crate::Result<()> {
        if self.topic.trim().is_empty() {
            return Err(SyncError::Validation("topic is required".to_string()));
        }
        Ok(())
    }
}

/// Creation request for a draft
pub type CreateFn<D> =
    Arc<dyn Fn(D) -> BoxFuture<'static, crate::Result<<D as Draft>::Entity>> + Send + Sync>;

pub struct DraftSubmitter<D: Draft> {
    create: CreateFn<D>,
    collection: Store<ResourceCollection<D::Entity>>,
    key: ActionKey,
    context: String,
    gate: Arc<ActionGate>,
    errors: ErrorSurface,
    liveness: Liveness,
}

impl<D: Draft> DraftSubmitter<D> {
    pub fn new(
        create: CreateFn<D>,
        collection: Store<ResourceCollection<D::Entity>>,
        key: ActionKey,
        context: impl Into<String>,
    ) -> Self {
        Self {
            create,
            collection,
            key,
            context: context.into(),
            gate: Arc::new(ActionGate::new()),
            errors: ErrorSurface::new(),
            liveness: Liveness::new(),
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

    pub fn key(&self) -> &ActionKey {
        &self.key
    }

    /// Validate and submit `draft`. On success the entity is prepended to
    /// the collection and `draft` is reset; on failure `draft` is left as
    /// the user typed it.
    pub async fn submit(&self, draft: &mut D) -> crate::Result<D::Entity> {
        if let Err(e) = draft.validate() {
            self.liveness
                .commit(self.errors.report(&self.context, &e))
                .await;
            return Err(e);
        }

        let request = (self.create)(draft.clone());
        let created = match self.gate.run(&self.key, request).await {
            Ok(entity) => entity,
            Err(e @ SyncError::ConcurrencyRejected(_)) => {
                self.liveness
                    .commit(self.errors.notice(ALREADY_RUNNING, &e))
                    .await;
                return Err(e);
            }
            Err(e) => {
                self.liveness
                    .commit(self.errors.report(&self.context, &e))
                    .await;
                return Err(e);
            }
        };

        *draft = D::default();
        let merged = self
            .liveness
            .commit(async {
                let dropped = self
                    .collection
                    .write()
                    .await
                    .update(|items| items.prepend(created.clone()));
                if let Some(dropped) = dropped {
                    tracing::debug!("Collection full, dropped '{}'", dropped.id());
                }
                self.errors.record_success().await;
            })
            .await;
        if merged.is_none() {
            tracing::debug!("Created '{}' after unmount, not merged", created.id());
        }

        Ok(created)
    }
}

impl DraftSubmitter<HackathonDraft> {
    /// Submitter for the "Create Hackathon" form
    pub fn for_hackathons(
        api: Arc<dyn HackathonApi>,
        collection: Store<ResourceCollection<Hackathon>>,
    ) -> Self {
        let create: CreateFn<HackathonDraft> = Arc::new(move |draft: HackathonDraft| {
            let api = Arc::clone(&api);
            async move { api.generate_plan(&draft).await }.boxed()
        });
        Self::new(
            create,
            collection,
            ActionKey::new(DRAFT_ENTITY, ActionKind::GeneratePlan),
            "Failed to generate plan",
        )
    }
}
