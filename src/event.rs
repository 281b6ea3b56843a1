use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

// ─── Wire types ──────────────────────────────────────────────────

/// One action as it arrives on the wire:
/// `{"Action": "jump", "Time": 100}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionEvent {
    #[serde(alias = "action")]
    pub action: String,

    #[serde(alias = "time", with = "json_number")]
    pub time: Decimal,
}

/// One line of the stats report: the mean `Time` for an `Action`.
/// Same shape as [`ActionEvent`] so reports can be fed back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionStat {
    #[serde(alias = "action")]
    pub action: String,

    #[serde(alias = "time", with = "json_number")]
    pub time: Decimal,
}

/// An event that passed validation. The store only accepts these,
/// so `EventStore::record` never re-checks label or sign.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvent {
    label: String,
    duration: Decimal,
}

// ─── Numeric field codec ─────────────────────────────────────────

/// `Time` must be a JSON number. Strings such as `"100"` are refused,
/// which `rust_decimal`'s own deserializer would otherwise accept.
mod json_number {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    pub use rust_decimal::serde::arbitrary_precision::serialize;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Number::deserialize(deserializer)?.to_string();
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(D::Error::custom)
    }
}

// ─── Decode / validate ───────────────────────────────────────────

/// Parse one JSON event. Any malformed input maps to the same
/// `Decoding` error; the serde detail is only logged.
pub fn decode(raw: &str) -> Result<ActionEvent> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::debug!(error = %e, "rejecting undecodable event");
        TrackerError::Decoding("Invalid json passed".into())
    })
}

/// Decode and validate in one step.
pub fn parse(raw: &str) -> Result<ValidatedEvent> {
    decode(raw)?.validate()
}

impl ActionEvent {
    pub fn new(action: impl Into<String>, time: Decimal) -> Self {
        Self {
            action: action.into(),
            time,
        }
    }

    pub fn validate(self) -> Result<ValidatedEvent> {
        ValidatedEvent::new(self.action, self.time)
            .map_err(TrackerError::Validation)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ValidatedEvent {
    /// Shared rule set for the adapter and the store's defensive path.
    /// Returns the human-readable reason on rejection.
    pub(crate) fn new(
        label: String,
        duration: Decimal,
    ) -> std::result::Result<Self, String> {
        if label.trim().is_empty() {
            return Err("Action must not be empty".into());
        }
        if duration.is_sign_negative() && !duration.is_zero() {
            return Err("Time must be 0 or greater".into());
        }
        Ok(Self { label, duration })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn duration(&self) -> Decimal {
        self.duration
    }

    pub fn into_parts(self) -> (String, Decimal) {
        (self.label, self.duration)
    }
}

impl TryFrom<ActionEvent> for ValidatedEvent {
    type Error = TrackerError;

    fn try_from(event: ActionEvent) -> Result<Self> {
        event.validate()
    }
}
