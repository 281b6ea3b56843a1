use serde::Deserialize;

use crate::error::{Result, TrackerError};

// ─── Simulation settings ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Number of concurrent Tokio tasks submitting events
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Events submitted by each worker
    #[serde(default = "default_events")]
    pub events_per_worker: u32,

    /// Percentage of submissions that are deliberately invalid (0–100)
    #[serde(default)]
    pub invalid_pct: u8,

    /// Base seed; worker `n` uses `seed + n`
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Labels the workers pick from
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    /// Durations are drawn uniformly from `0..=max_duration`
    #[serde(default = "default_max_duration")]
    pub max_duration: u32,
}

fn default_workers() -> u32 {
    10
}
fn default_events() -> u32 {
    1_000
}
fn default_seed() -> u64 {
    1000
}
fn default_labels() -> Vec<String> {
    ["jump", "run", "skip"].map(String::from).to_vec()
}
fn default_max_duration() -> u32 {
    250
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            events_per_worker: default_events(),
            invalid_pct: 0,
            seed: default_seed(),
            labels: default_labels(),
            max_duration: default_max_duration(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(raw).map_err(|e| TrackerError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 || self.workers > 500 {
            return Err(TrackerError::Config(
                "workers must be between 1 and 500".into(),
            ));
        }
        if self.events_per_worker == 0 {
            return Err(TrackerError::Config(
                "events_per_worker must be at least 1".into(),
            ));
        }
        if self.invalid_pct > 100 {
            return Err(TrackerError::Config(
                "invalid_pct must be between 0 and 100".into(),
            ));
        }
        if self.labels.is_empty() || self.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(TrackerError::Config(
                "labels must be a non-empty list of non-blank names".into(),
            ));
        }
        Ok(())
    }

    pub fn total_events(&self) -> u64 {
        self.workers as u64 * self.events_per_worker as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let cfg = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(cfg, SimulationConfig::default());
        assert_eq!(cfg.total_events(), 10_000);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for raw in [
            r#"{"workers":0}"#,
            r#"{"workers":501}"#,
            r#"{"events_per_worker":0}"#,
            r#"{"invalid_pct":101}"#,
            r#"{"labels":[]}"#,
            r#"{"labels":["ok",""]}"#,
        ] {
            let err = SimulationConfig::from_json(raw).unwrap_err();
            assert!(matches!(err, TrackerError::Config(_)), "{raw}");
        }
    }

    #[test]
    fn garbage_is_a_config_error() {
        assert!(matches!(
            SimulationConfig::from_json("nope"),
            Err(TrackerError::Config(_))
        ));
    }
}
