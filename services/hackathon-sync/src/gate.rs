//! Per-key mutual exclusion for user-triggered actions
//!
//! An [`ActionGate`] tracks one [`ActionRecord`] per (entity, action kind).
//! A key that is running refuses a second start instead of queueing it.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::state::current_epoch_ms;

/// The asynchronous actions a user can trigger on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Invite,
    SendEmails,
    GeneratePlan,
    GenerateProblems,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Invite => write!(f, "invite"),
            ActionKind::SendEmails => write!(f, "send-emails"),
            ActionKind::GeneratePlan => write!(f, "generate-plan"),
            ActionKind::GenerateProblems => write!(f, "generate-problems"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionKey {
    pub entity_id: String,
    pub kind: ActionKind,
}

impl ActionKey {
    pub fn new(entity_id: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            entity_id: entity_id.into(),
            kind,
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_id, self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStatus::Idle => write!(f, "idle"),
            ActionStatus::Running => write!(f, "running"),
            ActionStatus::Succeeded => write!(f, "succeeded"),
            ActionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Latest known state of one keyed action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub status: ActionStatus,
    pub last_error: Option<String>,
    pub started_epoch_ms: Option<u64>,
    pub finished_epoch_ms: Option<u64>,
}

/// Message recorded for an action whose future was dropped before finishing
pub const CANCELLED: &str = "cancelled";

/// Registry of keyed action records
#[derive(Debug, Default)]
pub struct ActionGate {
    records: Mutex<HashMap<ActionKey, ActionRecord>>,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<ActionKey, ActionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move `key` to running unless it already is. Returns whether the
    /// caller may issue the underlying request.
    pub async fn try_start(&self, key: &ActionKey) -> bool {
        let mut records = self.records();
        let record = records.entry(key.clone()).or_default();
        if record.status == ActionStatus::Running {
            tracing::debug!("Action {} denied: already running", key);
            return false;
        }
        record.status = ActionStatus::Running;
        record.started_epoch_ms = Some(current_epoch_ms());
        record.finished_epoch_ms = None;
        tracing::debug!("Action {} started", key);
        true
    }

    /// Finish a running action. No-op if `key` is not running.
    pub async fn complete(&self, key: &ActionKey, result: std::result::Result<(), String>) {
        self.finish(key, result);
    }

    fn finish(&self, key: &ActionKey, result: std::result::Result<(), String>) {
        let mut records = self.records();
        let Some(record) = records.get_mut(key) else {
            return;
        };
        if record.status != ActionStatus::Running {
            return;
        }
        record.finished_epoch_ms = Some(current_epoch_ms());
        match result {
            Ok(()) => {
                record.status = ActionStatus::Succeeded;
                record.last_error = None;
                tracing::debug!("Action {} succeeded", key);
            }
            Err(message) => {
                tracing::warn!("Action {} failed: {}", key, message);
                record.status = ActionStatus::Failed;
                record.last_error = Some(message);
            }
        }
    }

    /// Current record for `key`; idle if it was never started
    pub async fn status(&self, key: &ActionKey) -> ActionRecord {
        self.records().get(key).cloned().unwrap_or_default()
    }

    pub async fn is_running(&self, key: &ActionKey) -> bool {
        self.status(key).await.status == ActionStatus::Running
    }

    /// Keys currently in flight
    pub async fn running(&self) -> Vec<ActionKey> {
        self.records()
            .iter()
            .filter(|(_, record)| record.status == ActionStatus::Running)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Run `action` under `key`. A denied start returns
    /// `ConcurrencyRejected` and never polls `action`. If the returned
    /// future is dropped mid-flight the key is marked failed with
    /// [`CANCELLED`].
    pub async fn run<T, Fut>(&self, key: &ActionKey, action: Fut) -> crate::Result<T>
    where
        Fut: Future<Output = crate::Result<T>>,
    {
        if !self.try_start(key).await {
            return Err(SyncError::ConcurrencyRejected(key.clone()));
        }
        let mut guard = RunGuard {
            gate: self,
            key,
            armed: true,
        };
        let result = action.await;
        guard.armed = false;
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        };
        self.finish(key, outcome);
        result
    }

    /// Drop every record
    pub async fn clear(&self) {
        let mut records = self.records();
        if !records.is_empty() {
            tracing::debug!("Clearing {} action records", records.len());
        }
        records.clear();
    }
}

/// Fails a started key if its `run` future is dropped before the action ends
struct RunGuard<'a> {
    gate: &'a ActionGate,
    key: &'a ActionKey,
    armed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.gate.finish(self.key, Err(CANCELLED.to_string()));
        }
    }
}
