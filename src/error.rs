use thiserror::Error;

// ─── Unified error type ──────────────────────────────────────────

/// Everything that can go wrong between a raw event and the store.
///
/// `Decoding` and `Validation` are raised by the ingest adapter before the
/// store is touched. `Precondition` is only produced by the defensive
/// `EventStore::try_record` entry point.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{0}")]
    Decoding(String),

    #[error("{0}")]
    Validation(String),

    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("failed to encode JSON: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("simulation worker failed: {0}")]
    Worker(String),
}

impl TrackerError {
    /// True for errors caused by the caller's input rather than by us.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Decoding(_) | Self::Validation(_) | Self::Precondition(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
