//! BDD test world for hackathon-sync

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cucumber::World;

use hackathon_sync::api::HackathonApi;
use hackathon_sync::filter::TeamFilter;
use hackathon_sync::gate::ActionGate;
use hackathon_sync::model::{
    Challenge, Hackathon, HackathonDraft, HackathonPlan, Profile, ResourceCollection, Team,
};
use hackathon_sync::poller::PollSession;
use hackathon_sync::state::Store;
use hackathon_sync::surface::ErrorSurface;
use hackathon_sync::SyncError;

#[derive(Debug, Default, World)]
pub struct SyncWorld {
    pub api: Arc<ScriptedApi>,
    pub errors: ErrorSurface,

    // Action gate
    pub gate: Option<Arc<ActionGate>>,
    pub starts: Vec<bool>,

    // Team directory
    pub teams: Vec<Team>,
    pub filter: TeamFilter,
    pub visible: Vec<String>,

    // Draft submission
    pub hackathons: Option<Store<ResourceCollection<Hackathon>>>,
    pub draft: HackathonDraft,
    pub submit_result: Option<hackathon_sync::Result<Hackathon>>,

    // Polling
    pub profiles: Option<Store<ResourceCollection<Profile>>>,
    pub session: Option<PollSession>,
}

pub fn hackathon(id: &str, topic: &str) -> Hackathon {
    Hackathon {
        id: id.to_string(),
        topic: topic.to_string(),
        description: None,
        target_audience: None,
        location: None,
        start_date: None,
        end_date: None,
        status: "planned".to_string(),
        plan: None,
    }
}

pub fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// An API whose answers are scripted by the scenario
#[derive(Debug, Default)]
pub struct ScriptedApi {
    /// Successive profile answers; the last one repeats
    pub profile_batches: Mutex<Vec<Vec<Profile>>>,
    pub delay: Mutex<Option<Duration>>,
    pub plan_failing: AtomicBool,
    pub profile_calls: AtomicUsize,
    pub plan_calls: AtomicUsize,
}

impl ScriptedApi {
    fn delay(&self) -> Option<Duration> {
        *self.delay.lock().unwrap()
    }
}

#[async_trait]
impl HackathonApi for ScriptedApi {
    async fn list_profiles(&self, limit: usize) -> hackathon_sync::Result<ResourceCollection<Profile>> {
        let call = self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay() {
            tokio::time::sleep(delay).await;
        }
        let batch = {
            let batches = self.profile_batches.lock().unwrap();
            batches
                .get(call)
                .or_else(|| batches.last())
                .cloned()
                .unwrap_or_default()
        };
        Ok(ResourceCollection::from_items(batch, limit))
    }

    async fn list_teams(&self, limit: usize) -> hackathon_sync::Result<ResourceCollection<Team>> {
        Ok(ResourceCollection::new(limit))
    }

    async fn list_challenges(
        &self,
        limit: usize,
    ) -> hackathon_sync::Result<ResourceCollection<Challenge>> {
        Ok(ResourceCollection::new(limit))
    }

    async fn list_hackathons(
        &self,
        limit: usize,
    ) -> hackathon_sync::Result<ResourceCollection<Hackathon>> {
        Ok(ResourceCollection::new(limit))
    }

    async fn get_hackathon(&self, id: &str) -> hackathon_sync::Result<Hackathon> {
        Err(SyncError::UnexpectedStatus {
            url: format!("/hackathons/{}", id),
            status: 404,
            body: "Hackathon not found".to_string(),
        })
    }

    async fn generate_plan(&self, draft: &HackathonDraft) -> hackathon_sync::Result<Hackathon> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        if self.plan_failing.load(Ordering::SeqCst) {
            return Err(SyncError::UnexpectedStatus {
                url: "/hackathons/generate-plan".to_string(),
                status: 500,
                body: "LLM unavailable".to_string(),
            });
        }
        let draft = draft.normalized();
        let mut created = hackathon("h-new", &draft.topic);
        created.location = draft.location;
        created.plan = Some(HackathonPlan::default());
        Ok(created)
    }

    async fn create_invites(&self, _id: &str, _limit: usize) -> hackathon_sync::Result<u64> {
        Ok(0)
    }

    async fn send_emails(
        &self,
        _id: &str,
        _limit: usize,
        _dry_run: bool,
    ) -> hackathon_sync::Result<u64> {
        Ok(0)
    }

    async fn generate_problems(&self, id: &str) -> hackathon_sync::Result<Hackathon> {
        Ok(hackathon(id, "Unknown"))
    }
}
