//! Aggregator: concurrent multi-resource fetch joined into one snapshot

use std::sync::Arc;

use serde::Serialize;

use crate::api::HackathonApi;
use crate::liveness::Liveness;
use crate::model::{Challenge, Hackathon, Profile, ResourceCollection, Team};
use crate::state::Store;
use crate::surface::ErrorSurface;

/// Number of teams shown in the dashboard's "recent" panel
pub const RECENT_TEAMS: usize = 8;

/// How partial failure of a fan-out is handled
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AggregationPolicy {
    /// Any failed request fails the whole aggregate
    #[default]
    AllOrNothing,
}

/// One list request of a fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRequest {
    Profiles { limit: usize },
    Teams { limit: usize },
    Challenges { limit: usize },
    Hackathons { limit: usize },
}

/// Result of one [`ResourceRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "resource", content = "items", rename_all = "snake_case")]
pub enum FetchedCollection {
    Profiles(ResourceCollection<Profile>),
    Teams(ResourceCollection<Team>),
    Challenges(ResourceCollection<Challenge>),
    Hackathons(ResourceCollection<Hackathon>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub profiles: usize,
    pub teams: usize,
    pub challenges: usize,
}

/// Everything the dashboard renders, from one aggregate fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub profiles: ResourceCollection<Profile>,
    pub teams: ResourceCollection<Team>,
    pub challenges: ResourceCollection<Challenge>,
    pub recent_teams: Vec<Team>,
}

impl DashboardSnapshot {
    pub fn counts(&self) -> DashboardCounts {
        DashboardCounts {
            profiles: self.profiles.len(),
            teams: self.teams.len(),
            challenges: self.challenges.len(),
        }
    }
}

pub struct Aggregator {
    api: Arc<dyn HackathonApi>,
    policy: AggregationPolicy,
    recent: usize,
}

impl Aggregator {
    pub fn new(api: Arc<dyn HackathonApi>) -> Self {
        Self {
            api,
            policy: AggregationPolicy::default(),
            recent: RECENT_TEAMS,
        }
    }

    pub fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_recent(mut self, recent: usize) -> Self {
        self.recent = recent;
        self
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    /// Issue every request concurrently and wait for all of them to
    /// settle. Results come back in request order.
    pub async fn fetch_all(
        &self,
        requests: &[ResourceRequest],
    ) -> crate::Result<Vec<FetchedCollection>> {
        tracing::debug!("Fetching {} resources concurrently", requests.len());
        let settled =
            futures::future::join_all(requests.iter().map(|request| self.fetch_one(*request)))
                .await;

        match self.policy {
            AggregationPolicy::AllOrNothing => settled.into_iter().collect(),
        }
    }

    async fn fetch_one(&self, request: ResourceRequest) -> crate::Result<FetchedCollection> {
        match request {
            ResourceRequest::Profiles { limit } => self
                .api
                .list_profiles(limit)
                .await
                .map(FetchedCollection::Profiles),
            ResourceRequest::Teams { limit } => {
                self.api.list_teams(limit).await.map(FetchedCollection::Teams)
            }
            ResourceRequest::Challenges { limit } => self
                .api
                .list_challenges(limit)
                .await
                .map(FetchedCollection::Challenges),
            ResourceRequest::Hackathons { limit } => self
                .api
                .list_hackathons(limit)
                .await
                .map(FetchedCollection::Hackathons),
        }
    }

    /// Profiles, teams and challenges at `limit` each
    pub async fn load_dashboard(&self, limit: usize) -> crate::Result<DashboardSnapshot> {
        let fetched = self
            .fetch_all(&[
                ResourceRequest::Profiles { limit },
                ResourceRequest::Teams { limit },
                ResourceRequest::Challenges { limit },
            ])
            .await?;

        let mut snapshot = DashboardSnapshot::default();
        for collection in fetched {
            match collection {
                FetchedCollection::Profiles(profiles) => snapshot.profiles = profiles,
                FetchedCollection::Teams(teams) => snapshot.teams = teams,
                FetchedCollection::Challenges(challenges) => snapshot.challenges = challenges,
                FetchedCollection::Hackathons(_) => {}
            }
        }
        snapshot.recent_teams = snapshot.teams.head(self.recent).to_vec();

        let counts = snapshot.counts();
        tracing::debug!(
            "Dashboard loaded: {} profiles, {} teams, {} challenges",
            counts.profiles,
            counts.teams,
            counts.challenges
        );
        Ok(snapshot)
    }

    /// Load the dashboard and commit it to `store` while `liveness` holds.
    /// On failure the store keeps its previous snapshot. Returns whether a
    /// snapshot was applied.
    pub async fn refresh_into(
        &self,
        limit: usize,
        store: &Store<DashboardSnapshot>,
        liveness: &Liveness,
        errors: &ErrorSurface,
    ) -> bool {
        match self.load_dashboard(limit).await {
            Ok(snapshot) => liveness
                .commit(async {
                    store.write().await.replace(snapshot);
                    errors.record_success().await;
                })
                .await
                .is_some(),
            Err(e) => {
                tracing::warn!("Dashboard refresh failed: {}", e);
                liveness.commit(errors.report("Failed to load", &e)).await;
                false
            }
        }
    }
}
