//! In-memory `HackathonApi` for component tests

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{check_limit, HackathonApi};
use crate::error::SyncError;
use crate::model::{
    Challenge, Hackathon, HackathonDraft, HackathonPlan, ProblemStatement, Profile,
    ResourceCollection, Team,
};

#[derive(Default)]
pub(crate) struct StubApi {
    pub profiles: Vec<Profile>,
    pub teams: Vec<Team>,
    pub challenges: Vec<Challenge>,
    pub hackathons: Vec<Hackathon>,
    /// Every call sleeps this long before answering
    pub delay: Option<Duration>,
    pub failing: Mutex<HashSet<&'static str>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl StubApi {
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn enter(&self, operation: &'static str) -> crate::Result<()> {
        self.calls.lock().unwrap().push(operation);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(operation) {
            return Err(SyncError::Transport(format!("{operation} unavailable")));
        }
        Ok(())
    }
}

pub(crate) fn profile(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: Some(name.to_string()),
        location: None,
        status: None,
    }
}

pub(crate) fn team(id: &str, name: &str, challenge_id: Option<&str>) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        members: Vec::new(),
        skills_needed: Vec::new(),
        challenge_id: challenge_id.map(str::to_string),
    }
}

pub(crate) fn challenge(id: &str, title: &str) -> Challenge {
    Challenge {
        id: id.to_string(),
        title: title.to_string(),
        difficulty: "medium".to_string(),
    }
}

pub(crate) fn hackathon(id: &str, topic: &str) -> Hackathon {
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

#[async_trait]
impl HackathonApi for StubApi {
    async fn list_profiles(&self, limit: usize) -> crate::Result<ResourceCollection<Profile>> {
        check_limit(limit)?;
        self.enter("list_profiles").await?;
        Ok(ResourceCollection::from_items(self.profiles.clone(), limit))
    }

    async fn list_teams(&self, limit: usize) -> crate::Result<ResourceCollection<Team>> {
        check_limit(limit)?;
        self.enter("list_teams").await?;
        Ok(ResourceCollection::from_items(self.teams.clone(), limit))
    }

    async fn list_challenges(&self, limit: usize) -> crate::Result<ResourceCollection<Challenge>> {
        check_limit(limit)?;
        self.enter("list_challenges").await?;
        Ok(ResourceCollection::from_items(self.challenges.clone(), limit))
    }

    async fn list_hackathons(&self, limit: usize) -> crate::Result<ResourceCollection<Hackathon>> {
        check_limit(limit)?;
        self.enter("list_hackathons").await?;
        Ok(ResourceCollection::from_items(self.hackathons.clone(), limit))
    }

    async fn get_hackathon(&self, id: &str) -> crate::Result<Hackathon> {
        self.enter("get_hackathon").await?;
        self.hackathons
            .iter()
            .find(|h| h.id == id)
            .cloned()
            .ok_or_else(|| SyncError::UnexpectedStatus {
                url: format!("/hackathons/{id}"),
                status: 404,
                body: "Hackathon not found".to_string(),
            })
    }

    async fn generate_plan(&self, draft: &HackathonDraft) -> crate::Result<Hackathon> {
        self.enter("generate_plan").await?;
        let draft = draft.normalized();
        let mut created = hackathon("h-new", &draft.topic);
        created.location = draft.location.clone();
        created.plan = Some(HackathonPlan {
            location: draft.location,
            ..HackathonPlan::default()
        });
        Ok(created)
    }

    async fn create_invites(&self, _id: &str, limit: usize) -> crate::Result<u64> {
        check_limit(limit)?;
        self.enter("create_invites").await?;
        Ok(limit.min(12) as u64)
    }

    async fn send_emails(&self, _id: &str, limit: usize, _dry_run: bool) -> crate::Result<u64> {
        check_limit(limit)?;
        self.enter("send_emails").await?;
        Ok(limit.min(3) as u64)
    }

    async fn generate_problems(&self, id: &str) -> crate::Result<Hackathon> {
        self.enter("generate_problems").await?;
        let mut updated = self
            .hackathons
            .iter()
            .find(|h| h.id == id)
            .cloned()
            .unwrap_or_else(|| hackathon(id, "Unknown"));
        updated.plan = Some(HackathonPlan {
            problem_statements: vec![ProblemStatement {
                title: "Triage".to_string(),
                description: "Route incoming tickets".to_string(),
                difficulty: Some("medium".to_string()),
                skills_required: vec!["nlp".to_string()],
            }],
            ..HackathonPlan::default()
        });
        Ok(updated)
    }
}
