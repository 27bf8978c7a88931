//! Team-directory filter

use serde::{Deserialize, Serialize};

use crate::model::Team;

/// Name search plus optional challenge selection. Empty inputs match
/// every team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub challenge_id: Option<String>,
}

impl TeamFilter {
    pub fn new(query: impl Into<String>, challenge_id: Option<String>) -> Self {
        Self {
            query: query.into(),
            challenge_id,
        }
    }

    /// Case-insensitive substring match on the name, and exact match on the
    /// challenge when one is selected
    pub fn matches(&self, team: &Team) -> bool {
        let query = self.query.to_lowercase();
        let name_matches = query.is_empty() || team.name.to_lowercase().contains(&query);
        let challenge_matches = match self.challenge_id.as_deref() {
            None | Some("") => true,
            Some(wanted) => team.challenge_id.as_deref() == Some(wanted),
        };
        name_matches && challenge_matches
    }

    /// Teams passing the filter, in their original order
    pub fn apply<'a, I>(&self, teams: I) -> Vec<&'a Team>
    where
        I: IntoIterator<Item = &'a Team>,
    {
        teams.into_iter().filter(|team| self.matches(team)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.challenge_id.as_deref().unwrap_or("").is_empty()
    }

    /// Clear both inputs
    pub fn reset(&mut self) {
        self.query.clear();
        self.challenge_id = None;
    }
}
