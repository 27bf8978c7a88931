//! Wire records and the bounded collections that hold them
//!
//! These types mirror the JSON served by the hackathon API. Identifiers
//! travel as `_id`; `id` is accepted on input as well.

use serde::{Deserialize, Serialize};

/// Upper bound the API accepts for `limit`
pub const MAX_LIMIT: usize = 200;

/// A record with a unique identifier
pub trait Record {
    fn id(&self) -> &str;
}

/// A community member profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A team, optionally assigned to a challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub skills_needed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workshop {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemStatement {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
}

/// Generated plan attached to a hackathon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HackathonPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,
    #[serde(default)]
    pub workshops: Vec<Workshop>,
    #[serde(default)]
    pub agenda: Vec<AgendaItem>,
    #[serde(default)]
    pub problem_statements: Vec<ProblemStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hackathon {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default = "default_hackathon_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<HackathonPlan>,
}

fn default_hackathon_status() -> String {
    "planned".to_string()
}

/// Input of the "Create Hackathon" form, sent to `generate-plan`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HackathonDraft {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl HackathonDraft {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Copy with every field trimmed and blank optional fields dropped
    pub fn normalized(&self) -> Self {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            topic: self.topic.trim().to_string(),
            description: clean(&self.description),
            target_audience: clean(&self.target_audience),
            location: clean(&self.location),
            start_date: clean(&self.start_date),
            end_date: clean(&self.end_date),
        }
    }
}

macro_rules! impl_record {
    ($($ty:ty),*) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_record!(Profile, Team, Challenge, Hackathon);

/// An ordered, bounded snapshot of records as returned by a list endpoint
///
/// The collection never holds more than `limit` records. Server order is kept
/// unless a caller reorders explicitly via [`ResourceCollection::prepend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceCollection<T> {
    items: Vec<T>,
    limit: usize,
}

impl<T> Default for ResourceCollection<T> {
    fn default() -> Self {
        Self::new(MAX_LIMIT)
    }
}

impl<T> ResourceCollection<T> {
    /// An empty collection bounded by `limit`
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
        }
    }

    /// Build from a server response, truncating anything past `limit`
    pub fn from_items(mut items: Vec<T>, limit: usize) -> Self {
        if items.len() > limit {
            tracing::warn!(
                "Response held {} records for limit {}, truncating",
                items.len(),
                limit
            );
            items.truncate(limit);
        }
        Self { items, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The first `n` records (or fewer)
    pub fn head(&self, n: usize) -> &[T] {
        &self.items[..n.min(self.items.len())]
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Insert at the front. A full collection drops its last record, which is
    /// returned.
    pub fn prepend(&mut self, item: T) -> Option<T> {
        if self.limit == 0 {
            return Some(item);
        }
        self.items.insert(0, item);
        if self.items.len() > self.limit {
            self.items.pop()
        } else {
            None
        }
    }
}

impl<T: Record> ResourceCollection<T> {
    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Replace the record sharing `item`'s id, keeping its position.
    /// Returns false if no such record exists.
    pub fn replace_item(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }
}

/// A view-held value that can take in a fresh copy of one entity
pub trait MergeEntity<E> {
    /// Returns false if the entity has no place in this value
    fn merge(&mut self, entity: E) -> bool;
}

impl<T: Record> MergeEntity<T> for ResourceCollection<T> {
    fn merge(&mut self, entity: T) -> bool {
        self.replace_item(entity)
    }
}

/// A detail view holds at most one record; a different id is refused
impl<T: Record> MergeEntity<T> for Option<T> {
    fn merge(&mut self, entity: T) -> bool {
        match self {
            Some(current) if current.id() != entity.id() => false,
            _ => {
                *self = Some(entity);
                true
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a ResourceCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
