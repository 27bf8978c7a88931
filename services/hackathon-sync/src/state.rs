//! Shared view state: synced snapshots behind a lock

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::RwLock;

/// A value last replaced by a successful fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Synced<T> {
    pub value: T,
    /// Number of wholesale replacements so far
    pub revision: u64,
    pub last_synced_epoch_ms: Option<u64>,
}

impl<T> Synced<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            revision: 0,
            last_synced_epoch_ms: None,
        }
    }

    /// Replace the whole value, returning the previous one
    pub fn replace(&mut self, value: T) -> T {
        self.revision += 1;
        self.last_synced_epoch_ms = Some(current_epoch_ms());
        std::mem::replace(&mut self.value, value)
    }

    /// Edit the value in place, e.g. an optimistic insert. Counts as a
    /// revision but not as a sync.
    pub fn update<R>(&mut self, edit: impl FnOnce(&mut T) -> R) -> R {
        self.revision += 1;
        edit(&mut self.value)
    }

    /// Like [`Synced::update`], but `edit` reports whether it changed
    /// anything and the revision moves only if it did
    pub fn update_if(&mut self, edit: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = edit(&mut self.value);
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Whether any fetch has landed yet
    pub fn is_synced(&self) -> bool {
        self.last_synced_epoch_ms.is_some()
    }
}

/// Thread-safe shared state handle
pub type Store<T> = Arc<RwLock<Synced<T>>>;

pub fn new_store<T>(initial: T) -> Store<T> {
    Arc::new(RwLock::new(Synced::new(initial)))
}

/// Clone out the current snapshot
pub async fn snapshot<T: Clone>(store: &Store<T>) -> Synced<T> {
    store.read().await.clone()
}

pub fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
