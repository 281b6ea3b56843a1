use tracing::{trace, warn};

use crate::error::Result;
use crate::event::{self, ActionStat};
use crate::store::{EventStore, Snapshot};

/// JSON-in / JSON-out facade over one [`EventStore`].
///
/// `add_action` decodes and validates before the store is touched, so a
/// rejected event has no effect on any aggregate and no effect on other
/// callers. Share it across tasks with `Arc<ActionTracker>`.
#[derive(Debug, Default)]
pub struct ActionTracker {
    store: EventStore,
}

impl ActionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one `{"Action": .., "Time": ..}` record.
    pub fn add_action(&self, json: &str) -> Result<()> {
        let event = event::parse(json).inspect_err(|e| {
            warn!(error = %e, "rejected action");
        })?;
        trace!(label = event.label(), duration = %event.duration(), "recording");
        self.store.record(event).inspect_err(|e| {
            warn!(error = %e, "refused action");
        })
    }

    /// Mean time per action as a JSON array, sorted by action name.
    pub fn get_stats(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.stats())?)
    }

    /// Same data as `get_stats`, before serialization.
    pub fn stats(&self) -> Vec<ActionStat> {
        self.store.snapshot().into_records()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    // ── Async calling convention ────────────────────────────────
    // The store never blocks on I/O, so these complete without
    // yielding; they exist for callers already living in async code.

    pub async fn add_action_async(&self, json: &str) -> Result<()> {
        self.add_action(json)
    }

    pub async fn get_stats_async(&self) -> Result<String> {
        self.get_stats()
    }
}
