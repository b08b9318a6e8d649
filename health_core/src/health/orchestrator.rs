//! Runs a set of probes serially or concurrently and aggregates their verdicts

use crate::error::Result;
use crate::health::{Probe, Verdict};
use futures_util::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source reported by the composite verdict of a join-all run.
pub const PARALLEL_SOURCE: &str = "parallel";

/// How a parallel run decides it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Return as soon as any probe reports unhealthy.
    #[default]
    Race,
    /// Wait for every probe, then report all failures together.
    JoinAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serial,
    Parallel(Aggregation),
}

/// Result of one orchestrator run. `failure` is `None` when every probe that
/// ran was healthy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    pub failure: Option<Verdict>,
    pub verdicts: Vec<Verdict>,
}

impl RunOutcome {
    pub fn is_healthy(&self) -> bool {
        self.failure.is_none()
    }
}

/// Append-only verdict sink shared by the tasks of a parallel run.
#[derive(Debug, Clone, Default)]
pub struct VerdictCollector {
    entries: Arc<Mutex<Vec<(usize, Verdict)>>>,
}

impl VerdictCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, index: usize, verdict: Verdict) {
        self.entries.lock().push((index, verdict));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collected verdicts in declared probe order.
    pub fn snapshot(&self) -> Vec<Verdict> {
        let mut entries = self.entries.lock().clone();
        entries.sort_by_key(|(index, _)| *index);
        entries.into_iter().map(|(_, verdict)| verdict).collect()
    }

    /// Earliest-declared failure among the verdicts collected so far.
    pub fn first_failure(&self) -> Option<Verdict> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, verdict)| !verdict.is_healthy())
            .min_by_key(|(index, _)| *index)
            .map(|(_, verdict)| verdict.clone())
    }
}

#[derive(Clone, Default)]
pub struct Orchestrator {
    probes: Vec<Arc<dyn Probe>>,
    probe_delay: Duration,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_probe<P: Probe + 'static>(mut self, probe: P) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    /// Pause after each probe in serial mode.
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|probe| probe.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub async fn run(&self, mode: RunMode) -> Result<RunOutcome> {
        match mode {
            RunMode::Serial => Ok(self.run_serial().await),
            RunMode::Parallel(aggregation) => self.run_parallel(aggregation).await,
        }
    }

    /// Checks probes in declared order and stops at the first unhealthy one.
    pub async fn run_serial(&self) -> RunOutcome {
        info!("Running {} probes serially", self.probes.len());

        let mut verdicts = Vec::with_capacity(self.probes.len());

        for probe in &self.probes {
            let verdict = probe.check().await;

            if !self.probe_delay.is_zero() {
                tokio::time::sleep(self.probe_delay).await;
            }

            verdicts.push(verdict.clone());

            if !verdict.is_healthy() {
                warn!("Serial run stopped at '{}': {}", verdict.source(), verdict);
                return RunOutcome {
                    failure: Some(verdict),
                    verdicts,
                };
            }
        }

        debug!("Serial run completed, all {} probes healthy", verdicts.len());
        RunOutcome {
            failure: None,
            verdicts,
        }
    }

    pub async fn run_parallel(&self, aggregation: Aggregation) -> Result<RunOutcome> {
        info!(
            "Running {} probes in parallel ({:?})",
            self.probes.len(),
            aggregation
        );

        let collector = VerdictCollector::new();

        let mut pending: FuturesUnordered<_> = self
            .probes
            .iter()
            .enumerate()
            .map(|(index, probe)| {
                let probe = Arc::clone(probe);
                let collector = collector.clone();
                tokio::spawn(async move {
                    let verdict = probe.check().await;
                    collector.push(index, verdict.clone());
                    verdict
                })
            })
            .collect();

        let failure = match aggregation {
            Aggregation::Race => {
                let mut failure = None;
                while let Some(joined) = pending.next().await {
                    if !joined?.is_healthy() {
                        failure = collector.first_failure();
                        break;
                    }
                }
                if failure.is_some() && !pending.is_empty() {
                    debug!("Detaching {} probes still in flight", pending.len());
                }
                failure
            }
            Aggregation::JoinAll => {
                while let Some(joined) = pending.next().await {
                    joined?;
                }
                composite_failure(&collector.snapshot())
            }
        };

        let verdicts = collector.snapshot();
        for verdict in &verdicts {
            debug!("Parallel verdict from '{}': {}", verdict.source(), verdict);
        }

        match &failure {
            Some(verdict) => warn!("Parallel run failed: {}", verdict),
            None => debug!("Parallel run completed, all {} probes healthy", verdicts.len()),
        }

        Ok(RunOutcome { failure, verdicts })
    }

    /// Runs the single probe registered under `name`.
    pub async fn check_probe(&self, name: &str) -> Option<Verdict> {
        let probe = self.probes.iter().find(|probe| probe.name() == name)?;
        Some(probe.check().await)
    }
}

/// Folds every failing verdict into one, messages joined in declared order.
fn composite_failure(verdicts: &[Verdict]) -> Option<Verdict> {
    let messages: Vec<&str> = verdicts
        .iter()
        .filter(|verdict| !verdict.is_healthy())
        .map(|verdict| verdict.message().unwrap_or_else(|| verdict.source()))
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(Verdict::unhealthy(PARALLEL_SOURCE, messages.join("; ")))
    }
}
