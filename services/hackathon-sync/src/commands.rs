//! Subcommands of the `hackathon-sync` driver
//!
//! Each command mounts a [`ViewScope`], runs its components and renders the
//! result as JSON.

use std::sync::Arc;

use clap::Subcommand;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::aggregator::Aggregator;
use crate::api::HackathonApi;
use crate::config::Config;
use crate::filter::TeamFilter;
use crate::model::{Hackathon, HackathonDraft, ResourceCollection};
use crate::state::{new_store, snapshot};
use crate::view::ViewScope;

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load profiles, teams and challenges in one snapshot
    Dashboard,

    /// Poll community profiles until interrupted
    Community,

    /// List teams, optionally filtered
    Teams {
        /// Case-insensitive name search
        #[arg(long, default_value = "")]
        query: String,

        /// Only teams assigned to this challenge id
        #[arg(long)]
        challenge: Option<String>,
    },

    /// List hackathons
    Hackathons,

    /// Show one hackathon
    Hackathon { id: String },

    /// Create a hackathon and generate its plan
    Plan {
        #[arg(long)]
        topic: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        audience: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        start_date: Option<String>,

        #[arg(long)]
        end_date: Option<String>,
    },

    /// Create outreach invites for a hackathon
    Invite { id: String },

    /// Send invite emails for a hackathon
    SendEmails {
        id: String,

        /// Really send instead of a dry run
        #[arg(long)]
        send: bool,
    },

    /// Generate problem statements for a hackathon
    GenerateProblems { id: String },
}

impl Commands {
    pub fn view_name(&self) -> &'static str {
        match self {
            Commands::Dashboard => "dashboard",
            Commands::Community => "community",
            Commands::Teams { .. } => "teams",
            Commands::Hackathons | Commands::Plan { .. } | Commands::Invite { .. } => "hackathons",
            Commands::Hackathon { .. }
            | Commands::SendEmails { .. }
            | Commands::GenerateProblems { .. } => "hackathon",
        }
    }
}

/// Run `command` against `api`. `shutdown` ends long-running commands.
pub async fn execute(
    command: &Commands,
    config: &Config,
    api: Arc<dyn HackathonApi>,
    shutdown: CancellationToken,
) -> crate::Result<Value> {
    let view = ViewScope::new(command.view_name());
    let result = dispatch(command, config, api, &view, shutdown).await;
    view.unmount().await;
    result
}

async fn dispatch(
    command: &Commands,
    config: &Config,
    api: Arc<dyn HackathonApi>,
    view: &ViewScope,
    shutdown: CancellationToken,
) -> crate::Result<Value> {
    let limit = config.lists.limit;
    match command {
        Commands::Dashboard => {
            let dashboard = Aggregator::new(api)
                .with_recent(config.lists.recent)
                .load_dashboard(limit)
                .await?;
            Ok(json!({
                "counts": dashboard.counts(),
                "profiles": dashboard.profiles.as_slice(),
                "challenges": dashboard.challenges.as_slice(),
                "recent_teams": dashboard.recent_teams,
            }))
        }
        Commands::Community => community(config, api, view, shutdown).await,
        Commands::Teams { query, challenge } => {
            let teams = api.list_teams(limit).await?;
            let filter = TeamFilter::new(query.as_str(), challenge.clone());
            Ok(serde_json::to_value(filter.apply(&teams))?)
        }
        Commands::Hackathons => {
            let hackathons = api.list_hackathons(limit).await?;
            Ok(serde_json::to_value(hackathons.as_slice())?)
        }
        Commands::Hackathon { id } => {
            let detail = new_store::<Option<Hackathon>>(None);
            let hackathon = view
                .actions(api, config.outreach.clone())
                .load(id, &detail)
                .await?;
            Ok(serde_json::to_value(hackathon)?)
        }
        Commands::Plan {
            topic,
            description,
            audience,
            location,
            start_date,
            end_date,
        } => {
            let mut draft = HackathonDraft {
                topic: topic.clone(),
                description: description.clone(),
                target_audience: audience.clone(),
                location: location.clone(),
                start_date: start_date.clone(),
                end_date: end_date.clone(),
            };
            let list = new_store(ResourceCollection::<Hackathon>::new(limit));
            let created = view.hackathon_form(api, list).submit(&mut draft).await?;
            Ok(serde_json::to_value(created)?)
        }
        Commands::Invite { id } => {
            let list = new_store(ResourceCollection::<Hackathon>::new(limit));
            let invites = view
                .actions(api, config.outreach.clone())
                .refreshing(Arc::clone(&list), limit)
                .invite(id)
                .await?;
            let hackathons = snapshot(&list).await.value.into_vec();
            Ok(json!({ "hackathon": id, "invites": invites, "hackathons": hackathons }))
        }
        Commands::SendEmails { id, send } => {
            let mut outreach = config.outreach.clone();
            if *send {
                outreach.dry_run = false;
            }
            let dry_run = outreach.dry_run;
            let emails = view.actions(api, outreach).send_emails(id).await?;
            Ok(json!({ "hackathon": id, "emails": emails, "dry_run": dry_run }))
        }
        Commands::GenerateProblems { id } => {
            let detail = new_store::<Option<Hackathon>>(None);
            let hackathon = view
                .actions(api, config.outreach.clone())
                .generate_problems(id, &detail)
                .await?;
            Ok(serde_json::to_value(hackathon)?)
        }
    }
}

/// Poll profiles until `shutdown`; returns the last snapshot and counters
async fn community(
    config: &Config,
    api: Arc<dyn HackathonApi>,
    view: &ViewScope,
    shutdown: CancellationToken,
) -> crate::Result<Value> {
    let limit = config.lists.limit;
    let interval = config.polling.interval();
    let store = new_store(ResourceCollection::new(limit));

    view.poll(interval, Arc::clone(&store), "Failed to load", move || {
        let api = Arc::clone(&api);
        async move { api.list_profiles(limit).await }
    })
    .await?;
    tracing::info!("Polling profiles every {:?}", interval);

    let mut seen = 0;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
        let current = snapshot(&store).await;
        if current.revision != seen {
            seen = current.revision;
            tracing::info!("{} profiles (revision {})", current.value.len(), seen);
        }
        if let Some(report) = view.errors().current().await {
            tracing::warn!("{}", report.display());
        }
    }

    let stats = view.poll_stats().await;
    view.unmount().await;
    let current = snapshot(&store).await;
    let revision = current.revision;
    Ok(json!({
        "profiles": current.value.into_vec(),
        "revision": revision,
        "poll": stats,
    }))
}
