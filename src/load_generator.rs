use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::config::SimulationConfig;
use crate::error::{Result, TrackerError};
use crate::event::ActionEvent;
use crate::tracker::ActionTracker;

// ─── Public types ────────────────────────────────────────────────

/// Outcome of one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub accepted: u64,
    pub rejected: u64,
    pub elapsed: Duration,
}

impl SimulationReport {
    fn merge(&mut self, other: SimulationReport) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
    }
}

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `config.workers` Tokio tasks that submit events to `tracker`
/// until each has sent its quota or `running` is cleared.
///
/// Fails up front on an invalid config, and afterwards if any worker
/// panicked or errored; the other workers are still awaited first.
pub async fn run(
    running: Arc<AtomicBool>,
    tracker: Arc<ActionTracker>,
    config: SimulationConfig,
) -> Result<SimulationReport> {
    config.validate()?;
    let t0 = Instant::now();
    let config = Arc::new(config);

    info!(
        workers = config.workers,
        events_per_worker = config.events_per_worker,
        invalid_pct = config.invalid_pct,
        "starting simulation"
    );

    let mut handles = Vec::with_capacity(config.workers as usize);

    for worker_id in 0..config.workers {
        let running = running.clone();
        let tracker = tracker.clone();
        let config = config.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, running, tracker, config).await
        }));
    }

    let mut report = SimulationReport::default();
    let mut failure = None;
    for (worker_id, h) in handles.into_iter().enumerate() {
        let err = match h.await {
            Ok(Ok(part)) => {
                report.merge(part);
                continue;
            }
            Ok(Err(e)) => e,
            Err(join) => TrackerError::Worker(join.to_string()),
        };
        error!(worker = worker_id, error = %err, "worker failed");
        failure.get_or_insert(err);
    }

    running.store(false, Ordering::SeqCst);
    if let Some(err) = failure {
        return Err(err);
    }
    report.elapsed = t0.elapsed();

    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "simulation finished"
    );
    Ok(report)
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(
    id: u32,
    running: Arc<AtomicBool>,
    tracker: Arc<ActionTracker>,
    config: Arc<SimulationConfig>,
) -> Result<SimulationReport> {
    // Each worker gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(id as u64));
    let mut report = SimulationReport::default();

    for _ in 0..config.events_per_worker {
        if !running.load(Ordering::Relaxed) {
            debug!(worker = id, "stopped early");
            break;
        }

        let payload = next_payload(&mut rng, &config)?;
        match tracker.add_action_async(&payload).await {
            Ok(()) => report.accepted += 1,
            Err(_) => report.rejected += 1,
        }

        // Let other workers interleave with this one.
        tokio::task::yield_now().await;
    }

    Ok(report)
}

// ─── Payload generation ──────────────────────────────────────────

fn next_payload(rng: &mut StdRng, config: &SimulationConfig) -> Result<String> {
    let label = &config.labels[rng.gen_range(0..config.labels.len())];

    if rng.gen_range(0u8..100) < config.invalid_pct {
        // Half malformed JSON, half a negative duration.
        return Ok(if rng.gen_bool(0.5) {
            format!("{{\"Action\":\"{label}\",")
        } else {
            let time = -(rng.gen_range(1..=config.max_duration.max(1)) as i64);
            format!("{{\"Action\":\"{label}\",\"Time\":{time}}}")
        });
    }

    let time = Decimal::from(rng.gen_range(0..=config.max_duration));
    ActionEvent::new(label.clone(), time).to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(invalid_pct: u8) -> SimulationConfig {
        SimulationConfig {
            workers: 4,
            events_per_worker: 50,
            invalid_pct,
            ..SimulationConfig::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_submission_is_accounted_for() {
        let tracker = Arc::new(ActionTracker::new());
        let report = run(Arc::new(AtomicBool::new(true)), tracker.clone(), cfg(20))
            .await
            .unwrap();

        assert_eq!(report.accepted + report.rejected, 200);
        let recorded: u64 = tracker
            .store()
            .aggregates()
            .values()
            .map(|a| a.count)
            .sum();
        assert_eq!(recorded, report.accepted);
    }

    #[tokio::test]
    async fn all_valid_when_invalid_pct_is_zero() {
        let tracker = Arc::new(ActionTracker::new());
        let report = run(Arc::new(AtomicBool::new(true)), tracker, cfg(0))
            .await
            .unwrap();
        assert_eq!(report.rejected, 0);
        assert_eq!(report.accepted, 200);
    }

    #[tokio::test]
    async fn cleared_flag_submits_nothing() {
        let tracker = Arc::new(ActionTracker::new());
        let report = run(Arc::new(AtomicBool::new(false)), tracker.clone(), cfg(0))
            .await
            .unwrap();
        assert_eq!(report.accepted + report.rejected, 0);
        assert!(tracker.snapshot().is_empty());
    }

    #[tokio::test]
    async fn invalid_config_is_refused_before_spawning() {
        let tracker = Arc::new(ActionTracker::new());
        let config = SimulationConfig {
            labels: vec![],
            ..cfg(0)
        };
        let err = run(Arc::new(AtomicBool::new(true)), tracker.clone(), config)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn same_seed_same_payloads() {
        let config = cfg(30);
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(
                next_payload(&mut a, &config).unwrap(),
                next_payload(&mut b, &config).unwrap()
            );
        }
    }
}
