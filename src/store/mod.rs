pub mod aggregate;
pub mod snapshot;

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use tracing::{debug, warn};

pub use aggregate::Aggregate;
pub use snapshot::Snapshot;

use crate::error::{Result, TrackerError};
use crate::event::ValidatedEvent;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe accumulator of durations keyed by label.
///
/// Writers call `record()`, readers call `snapshot()`. Neither needs any
/// external synchronization.
///
/// Locking is two-level: the label map sits behind an `RwLock` that is
/// only taken exclusively when a label is seen for the first time, and
/// every label owns its own `Mutex<Aggregate>`. Updates to different
/// labels therefore never wait on each other.
#[derive(Debug, Default)]
pub struct EventStore {
    labels: RwLock<HashMap<String, Mutex<Aggregate>>>,
}

// ─── EventStore impl ─────────────────────────────────────────────

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one validated event into its label's aggregate.
    ///
    /// Only fails if the label's sum would leave the decimal range; the
    /// aggregate is then left exactly as it was.
    pub fn record(&self, event: ValidatedEvent) -> Result<()> {
        let (label, duration) = event.into_parts();

        // Fast path: label already known, shared lock only.
        {
            let labels = self.labels.read();
            if let Some(agg) = labels.get(&label) {
                return Self::apply(&label, &mut agg.lock(), duration);
            }
        }

        // Slow path: another writer may have inserted the label between
        // dropping the read lock and taking the write lock.
        let mut labels = self.labels.write();
        match labels.get(&label) {
            Some(agg) => Self::apply(&label, &mut agg.lock(), duration),
            None => {
                debug!(label = %label, %duration, "new label");
                labels.insert(label, Mutex::new(Aggregate::first(duration)));
                Ok(())
            }
        }
    }

    /// Defensive entry point for callers that have not validated their
    /// input. Bad data is refused before any state is touched.
    pub fn try_record(&self, label: impl Into<String>, duration: Decimal) -> Result<()> {
        let event = ValidatedEvent::new(label.into(), duration)
            .map_err(TrackerError::Precondition)?;
        self.record(event)
    }

    /// Mean duration for every label recorded so far.
    pub fn snapshot(&self) -> Snapshot {
        let means = self
            .labels
            .read()
            .iter()
            .map(|(label, agg)| (label.clone(), agg.lock().mean()))
            .collect();
        Snapshot::from_means(means)
    }

    /// Raw `(count, sum)` for every label, with the same per-label
    /// consistency as `snapshot()`.
    pub fn aggregates(&self) -> HashMap<String, Aggregate> {
        self.labels
            .read()
            .iter()
            .map(|(label, agg)| (label.clone(), *agg.lock()))
            .collect()
    }

    pub fn aggregate(&self, label: &str) -> Option<Aggregate> {
        self.labels.read().get(label).map(|agg| *agg.lock())
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.read().is_empty()
    }

    fn apply(label: &str, agg: &mut Aggregate, duration: Decimal) -> Result<()> {
        if agg.incorporate(duration) {
            return Ok(());
        }
        warn!(label, %duration, "sum overflow, event refused");
        Err(TrackerError::Validation("Time out of range".into()))
    }
}
