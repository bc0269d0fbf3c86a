//! # Discovery Service
//!
//! Implements the core "Discover a range" use case.
//!
//! The service submits a job through the [`DiscoverySubmitter`] and then
//! hands it to a background [`ProgressPoller`]. Callers follow the job
//! through the [`DiscoveryHandle`] it returns.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span};

use sweepr_common::config::{Config, FailureAccounting};
use sweepr_common::discovery::job::DiscoveryJob;
use sweepr_common::discovery::request::DiscoveryRequest;
use sweepr_common::discovery::snapshot::{
    DiscoveryEvent, DiscoveryReport, JobOutcome, ProgressSnapshot,
};
use sweepr_common::error::{DiscoveryError, PollTransportError};
use sweepr_common::rpc::DiscoveryRpc;
use sweepr_common::{debug, error};

use crate::poller::ProgressPoller;
use crate::submit::{DiscoverySubmitter, SubmittedJob};
use crate::summary::{self, Termination};

/// Application Service for discovery jobs.
///
/// Orchestrates a job by:
/// 1. validating and submitting the request to the agent.
/// 2. polling the agent in the background until the job ends.
pub struct DiscoveryService {
    rpc: Arc<dyn DiscoveryRpc>,
    config: Config,
}

impl DiscoveryService {
    pub fn new(rpc: Arc<dyn DiscoveryRpc>, config: Config) -> Self {
        Self { rpc, config }
    }

    /// Submits `request` and starts polling it.
    ///
    /// Validation and submission errors are returned before any task is
    /// spawned. Must be called from within a Tokio runtime.
    pub async fn start_discovery(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<DiscoveryHandle, DiscoveryError> {
        let submitter = DiscoverySubmitter::new(self.rpc.clone(), self.config.request_timeout);
        let SubmittedJob { job, snapshot } = submitter.submit(request).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let poller = ProgressPoller::new(
            self.rpc.clone(),
            job.clone(),
            snapshot.clone(),
            self.config.clone(),
            tx,
            cancel.clone(),
        );

        debug!(job_id = %job.job_id, "Spawning progress poller");
        let span = info_span!("poller", job_id = %job.job_id);
        let task = tokio::spawn(poller.run().instrument(span));

        Ok(DiscoveryHandle {
            job,
            initial: snapshot,
            events: rx,
            cancel,
            task,
            accounting: self.config.failure_accounting,
        })
    }

    /// Runs a job to completion, passing every event to `on_event`.
    pub async fn run_discovery<F>(
        &self,
        request: &DiscoveryRequest,
        mut on_event: F,
    ) -> Result<DiscoveryReport, DiscoveryError>
    where
        F: FnMut(&DiscoveryEvent),
    {
        let mut handle = self.start_discovery(request).await?;
        while let Some(event) = handle.next_event().await {
            on_event(&event);
            if let DiscoveryEvent::Finished(report) = event {
                return Ok(report);
            }
        }
        Ok(handle.wait().await)
    }
}

/// A running discovery job.
#[derive(Debug)]
pub struct DiscoveryHandle {
    job: DiscoveryJob,
    initial: ProgressSnapshot,
    events: UnboundedReceiver<DiscoveryEvent>,
    cancel: CancellationToken,
    task: JoinHandle<DiscoveryReport>,
    accounting: FailureAccounting,
}

impl DiscoveryHandle {
    pub fn job(&self) -> &DiscoveryJob {
        &self.job
    }

    /// The snapshot shown before the first status query.
    pub fn initial_snapshot(&self) -> &ProgressSnapshot {
        &self.initial
    }

    /// Next event of the job. `None` once the stream is closed.
    pub async fn next_event(&mut self) -> Option<DiscoveryEvent> {
        self.events.recv().await
    }

    /// Stops polling. The job still ends with a `Finished` event.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the poller and returns its report.
    pub async fn wait(self) -> DiscoveryReport {
        let Self {
            job,
            initial,
            events,
            task,
            accounting,
            ..
        } = self;

        let report = task.await;
        drop(events);

        report.unwrap_or_else(|err| {
            error!(job_id = %job.job_id, "Progress poller aborted: {err}");
            DiscoveryReport {
                job_id: job.job_id,
                outcome: JobOutcome::Error(PollTransportError::Transport {
                    message: format!("progress poller aborted: {err}"),
                }),
                summary: summary::summarize(
                    Termination::Error,
                    Some(&initial),
                    job.total_targets,
                    accounting,
                ),
            }
        })
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
