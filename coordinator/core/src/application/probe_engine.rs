// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Probe Engine
//!
//! Bounded fan-out of credential probes with a single result collector.
//!
//! One run looks like this:
//!
//! 1. Filter the targets against one agent-document snapshot.
//! 2. Spawn one worker per enabled target; a semaphore admits at most
//!    `concurrency` of them at a time and the dispatcher waits for a permit
//!    before spawning the next.
//! 3. Every worker sends exactly one [`ProbeResult`] to the aggregator task,
//!    which is the only owner of the report.
//! 4. Once all workers are joined, a `Stop` message is queued behind the
//!    results and the aggregator hands the finished report back over a
//!    oneshot channel.
//!
//! A probe that errors, panics or runs past `probe_timeout` becomes a failed
//! result for that target only. With a `deadline`, workers still running when
//! it expires are aborted and the report is returned with `partial` set.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::agent_config::AgentConfig;
use crate::domain::probe::{ProbeError, ProbeReport, ProbeResult, ProbeTarget};
use crate::domain::settings::ProbeSettings;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

enum AggregatorMsg {
    Result(ProbeResult),
    Stop(oneshot::Sender<ProbeReport>),
}

#[derive(Debug, Clone)]
pub struct ProbeEngine {
    concurrency: usize,
    probe_timeout: Duration,
    deadline: Option<Duration>,
}

impl Default for ProbeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY, DEFAULT_PROBE_TIMEOUT)
    }
}

impl ProbeEngine {
    pub fn new(concurrency: usize, probe_timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            probe_timeout,
            deadline: None,
        }
    }

    /// Bound the whole run, not just individual probes.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn from_settings(settings: &ProbeSettings) -> Self {
        let engine = Self::new(settings.concurrency, settings.probe_timeout);
        match settings.deadline {
            Some(deadline) => engine.with_deadline(deadline),
            None => engine,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probe every target enabled in `snapshot`.
    ///
    /// Returns [`ProbeError::NoTargetsConfigured`] without spawning anything
    /// when no target is enabled.
    pub async fn run_all(
        &self,
        snapshot: Arc<AgentConfig>,
        targets: &[Arc<dyn ProbeTarget>],
    ) -> Result<ProbeReport, ProbeError> {
        let enabled: Vec<Arc<dyn ProbeTarget>> = targets
            .iter()
            .filter(|t| t.is_enabled(&snapshot))
            .cloned()
            .collect();

        if enabled.is_empty() {
            warn!("No probe targets configured, nothing to check");
            return Err(ProbeError::NoTargetsConfigured);
        }

        let expected = enabled.len();
        info!(
            targets = expected,
            concurrency = self.concurrency,
            "Starting credential probe run"
        );

        // Room for every result plus Stop, so sends never wait on the collector
        let (tx, rx) = mpsc::channel(expected + 1);
        let aggregator = tokio::spawn(aggregate(rx));

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut workers = JoinSet::new();

        let dispatch = async {
            for target in enabled {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                workers.spawn(run_unit(
                    target,
                    snapshot.clone(),
                    self.probe_timeout,
                    tx.clone(),
                    permit,
                ));
            }
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    error!("Probe worker failed to join: {}", e);
                }
            }
        };

        let timed_out = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, dispatch).await.is_err(),
            None => {
                dispatch.await;
                false
            }
        };

        if timed_out {
            warn!("Probe deadline expired, aborting outstanding probes");
            workers.abort_all();
            while workers.join_next().await.is_some() {}
        }

        // Every worker has finished its send, so Stop is queued behind all results
        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(AggregatorMsg::Stop(ack_tx)).await.is_err() {
            error!("Probe aggregator exited before stop");
            return Err(ProbeError::AggregatorLost);
        }
        drop(tx);

        let mut report = ack_rx.await.map_err(|_| ProbeError::AggregatorLost)?;
        if let Err(e) = aggregator.await {
            error!("Probe aggregator task failed: {}", e);
        }

        if timed_out {
            let missing = expected.saturating_sub(report.results.len());
            report.partial = true;
            report
                .text
                .push_str(&format!("deadline exceeded: {} target(s) did not report\n", missing));
        }

        let outcome = if report.partial {
            "partial"
        } else if report.success() {
            "success"
        } else {
            "failure"
        };
        metrics::counter!("scoutline_probe_runs_total", "outcome" => outcome).increment(1);
        info!(
            reported = report.results.len(),
            success = report.success(),
            partial = report.partial,
            "Credential probe run finished"
        );

        Ok(report)
    }
}

async fn run_unit(
    target: Arc<dyn ProbeTarget>,
    snapshot: Arc<AgentConfig>,
    probe_timeout: Duration,
    tx: mpsc::Sender<AggregatorMsg>,
    permit: OwnedSemaphorePermit,
) {
    let name = target.name().to_string();
    let probe = AssertUnwindSafe(target.probe(&snapshot)).catch_unwind();

    let result = match tokio::time::timeout(probe_timeout, probe).await {
        Ok(Ok(Ok(finding))) if finding.found => ProbeResult::ok(&name),
        Ok(Ok(Ok(finding))) => ProbeResult::fail(&name, finding.detail.as_deref()),
        Ok(Ok(Err(e))) => ProbeResult::fail(&name, Some(&e.to_string())),
        Ok(Err(_)) => {
            error!(probe_target = %name, "Probe panicked");
            ProbeResult::fail(&name, Some("probe panicked"))
        }
        Err(_) => {
            warn!(probe_target = %name, timeout = ?probe_timeout, "Probe timed out");
            ProbeResult::fail(&name, Some("timed out"))
        }
    };
    drop(permit);

    debug!(probe_target = %name, success = result.success, "Probe finished");
    if tx.send(AggregatorMsg::Result(result)).await.is_err() {
        warn!(probe_target = %name, "Probe aggregator gone, dropping result");
    }
}

async fn aggregate(mut rx: mpsc::Receiver<AggregatorMsg>) {
    let mut report = ProbeReport::default();
    while let Some(msg) = rx.recv().await {
        match msg {
            AggregatorMsg::Result(result) => {
                report.text.push_str(&result.message);
                report.text.push('\n');
                report.results.push(result);
            }
            AggregatorMsg::Stop(ack) => {
                let _ = ack.send(report);
                return;
            }
        }
    }
}
