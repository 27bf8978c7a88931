//! Hackathon API client
//!
//! Every endpoint the dashboard views consume, behind the [`HackathonApi`]
//! trait so components can be driven by test doubles.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::SyncError;
use crate::io::{HttpClient, HttpResponse, ReqwestHttpClient};
use crate::model::{
    Challenge, Hackathon, HackathonDraft, Profile, ResourceCollection, Team, MAX_LIMIT,
};

/// Operations offered by the remote hackathon API
#[async_trait]
pub trait HackathonApi: Send + Sync {
    async fn list_profiles(&self, limit: usize) -> crate::Result<ResourceCollection<Profile>>;

    async fn list_teams(&self, limit: usize) -> crate::Result<ResourceCollection<Team>>;

    async fn list_challenges(&self, limit: usize) -> crate::Result<ResourceCollection<Challenge>>;

    async fn list_hackathons(&self, limit: usize) -> crate::Result<ResourceCollection<Hackathon>>;

    async fn get_hackathon(&self, id: &str) -> crate::Result<Hackathon>;

    /// Create a hackathon from a draft; the server attaches a generated plan
    async fn generate_plan(&self, draft: &HackathonDraft) -> crate::Result<Hackathon>;

    /// Create outreach invites; returns how many were created
    async fn create_invites(&self, id: &str, limit: usize) -> crate::Result<u64>;

    /// Send invite emails; returns how many were attempted
    async fn send_emails(&self, id: &str, limit: usize, dry_run: bool) -> crate::Result<u64>;

    async fn generate_problems(&self, id: &str) -> crate::Result<Hackathon>;
}

/// Reject a `limit` the API would refuse, before any request goes out
pub fn check_limit(limit: usize) -> crate::Result<()> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(SyncError::Validation(format!(
            "limit must be within 1..={}, got {}",
            MAX_LIMIT, limit
        )));
    }
    Ok(())
}

/// HTTP implementation of [`HackathonApi`]
pub struct ApiClient {
    base_url: Url,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> crate::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("Invalid API base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "API base URL {} cannot carry a path",
                base_url
            )));
        }

        tracing::debug!("Created ApiClient for {}", base_url);
        Ok(Self { base_url, http })
    }

    /// Build a client with the reqwest transport described by `config`
    pub fn from_config(config: &ApiConfig) -> crate::Result<Self> {
        let http = ReqwestHttpClient::with_timeout(config.request_timeout())?;
        Self::new(&config.base_url, Arc::new(http))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Join path segments onto the base URL and append the query.
    /// A trailing empty segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> crate::Result<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config(format!("Cannot extend URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> crate::Result<T> {
        let response = self.http.get(url).await?;
        decode(url, response)
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, body: Option<String>) -> crate::Result<T> {
        let response = self.http.post_json(url, body).await?;
        decode(url, response)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        limit: usize,
    ) -> crate::Result<ResourceCollection<T>> {
        check_limit(limit)?;
        let url = self.endpoint(segments, &[("limit", limit.to_string())])?;
        let items: Vec<T> = self.fetch(&url).await?;
        tracing::debug!("Listed {} records from {}", items.len(), url);
        Ok(ResourceCollection::from_items(items, limit))
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: HttpResponse) -> crate::Result<T> {
    if !response.is_success() {
        return Err(SyncError::UnexpectedStatus {
            url: url.to_string(),
            status: response.status,
            body: response.body,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| SyncError::InvalidResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl HackathonApi for ApiClient {
    async fn list_profiles(&self, limit: usize) -> crate::Result<ResourceCollection<Profile>> {
        self.list(&["profiles", ""], limit).await
    }

    async fn list_teams(&self, limit: usize) -> crate::Result<ResourceCollection<Team>> {
        self.list(&["teams"], limit).await
    }

    async fn list_challenges(&self, limit: usize) -> crate::Result<ResourceCollection<Challenge>> {
        self.list(&["challenges", ""], limit).await
    }

    async fn list_hackathons(&self, limit: usize) -> crate::Result<ResourceCollection<Hackathon>> {
        self.list(&["hackathons", ""], limit).await
    }

    async fn get_hackathon(&self, id: &str) -> crate::Result<Hackathon> {
        let url = self.endpoint(&["hackathons", id], &[])?;
        self.fetch(&url).await
    }

    async fn generate_plan(&self, draft: &HackathonDraft) -> crate::Result<Hackathon> {
        let url = self.endpoint(&["hackathons", "generate-plan"], &[])?;
        let body = serde_json::to_string(&draft.normalized())?;
        tracing::debug!("Requesting plan for topic '{}'", draft.topic.trim());
        self.post(&url, Some(body)).await
    }

    async fn create_invites(&self, id: &str, limit: usize) -> crate::Result<u64> {
        check_limit(limit)?;
        let url = self.endpoint(&["hackathons", id, "invite"], &[("limit", limit.to_string())])?;
        self.post(&url, None).await
    }

    async fn send_emails(&self, id: &str, limit: usize, dry_run: bool) -> crate::Result<u64> {
        check_limit(limit)?;
        let url = self.endpoint(
            &["hackathons", id, "send-emails"],
            &[("limit", limit.to_string()), ("dry_run", dry_run.to_string())],
        )?;
        self.post(&url, None).await
    }

    async fn generate_problems(&self, id: &str) -> crate::Result<Hackathon> {
        let url = self.endpoint(&["hackathons", id, "generate-problems"], &[])?;
        self.post(&url, None).await
    }
}
