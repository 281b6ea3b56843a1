//! In-memory tracker of action durations.
//!
//! Events arrive as JSON (`{"Action": "jump", "Time": 100}`), are decoded
//! and validated by [`event`], and land in a concurrent [`store::EventStore`]
//! that reports the mean duration per action on demand.

pub mod config;
pub mod error;
pub mod event;
pub mod load_generator;
pub mod store;
pub mod tracker;

pub use config::SimulationConfig;
pub use error::{Result, TrackerError};
pub use event::{ActionEvent, ActionStat, ValidatedEvent};
pub use store::{Aggregate, EventStore, Snapshot};
pub use tracker::ActionTracker;
