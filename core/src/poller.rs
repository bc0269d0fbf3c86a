//! # Progress Poller
//!
//! Drives one submitted job to its end. Each tick issues a single status
//! query, reconciles the answer into the job's snapshot and emits it. The
//! loop stops on a terminal agent status, on a query that fails past the
//! retry policy, or when the job's [`CancellationToken`] fires. In every
//! case exactly one [`DiscoveryEvent::Finished`] closes the event stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use sweepr_common::config::Config;
use sweepr_common::discovery::job::DiscoveryJob;
use sweepr_common::discovery::payload::{ReportedStatus, StatusPayload};
use sweepr_common::discovery::snapshot::{
    DiscoveryEvent, DiscoveryReport, JobOutcome, ProgressSnapshot, SnapshotStatus,
};
use sweepr_common::error::{BackendFailedError, PollTransportError};
use sweepr_common::rpc::DiscoveryRpc;
use sweepr_common::{debug, error, info, success, warn};

use crate::reconcile::{self, ReconcileContext};
use crate::summary::{self, Termination};

/// Result of one status query, after retries.
enum Query {
    Payload(StatusPayload),
    Failed(PollTransportError),
    Cancelled,
}

/// Why the polling loop ended.
enum Ending {
    Terminal(ReportedStatus, StatusPayload),
    Error(PollTransportError),
    Cancelled,
}

pub struct ProgressPoller {
    rpc: Arc<dyn DiscoveryRpc>,
    job: DiscoveryJob,
    snapshot: ProgressSnapshot,
    ctx: ReconcileContext,
    config: Config,
    events: UnboundedSender<DiscoveryEvent>,
    cancel: CancellationToken,
}

impl ProgressPoller {
    pub fn new(
        rpc: Arc<dyn DiscoveryRpc>,
        job: DiscoveryJob,
        snapshot: ProgressSnapshot,
        config: Config,
        events: UnboundedSender<DiscoveryEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ctx: ReconcileContext::for_job(&job),
            rpc,
            job,
            snapshot,
            config,
            events,
            cancel,
        }
    }

    /// Polls until the job ends, emits the final report and returns it.
    pub async fn run(mut self) -> DiscoveryReport {
        let ending = self.poll_until_terminal().await;

        let (outcome, termination) = match &ending {
            Ending::Terminal(ReportedStatus::Failed, payload) => {
                let err = BackendFailedError {
                    errors: self.snapshot.errors.clone(),
                };
                error!(job_id = %self.job.job_id, "{err}");
                (JobOutcome::Failed(err), Termination::Failed(payload))
            }
            Ending::Terminal(_, payload) => (JobOutcome::Completed, Termination::Completed(payload)),
            Ending::Error(err) => {
                error!(job_id = %self.job.job_id, "{err}");
                (JobOutcome::Error(err.clone()), Termination::Error)
            }
            Ending::Cancelled => {
                info!(job_id = %self.job.job_id, "Discovery polling cancelled");
                (JobOutcome::Cancelled, Termination::Cancelled)
            }
        };

        let summary = summary::summarize(
            termination,
            Some(&self.snapshot),
            self.job.total_targets,
            self.config.failure_accounting,
        );

        if outcome.is_success() {
            success!(
                job_id = %self.job.job_id,
                "Discovery finished: {} devices found, {} failed out of {} targets",
                summary.discovered_devices,
                summary.failed_devices,
                summary.total_targets
            );
        }

        let report = DiscoveryReport {
            job_id: self.job.job_id.clone(),
            outcome,
            summary,
        };
        let _ = self.events.send(DiscoveryEvent::Finished(report.clone()));
        report
    }

    async fn poll_until_terminal(&mut self) -> Ending {
        loop {
            let payload = match self.query().await {
                Query::Payload(payload) => payload,
                Query::Cancelled => return Ending::Cancelled,
                Query::Failed(err) => {
                    self.snapshot.status = SnapshotStatus::Error;
                    self.snapshot.message = reconcile::describe(&self.snapshot);
                    self.emit_snapshot();
                    return Ending::Error(err);
                }
            };

            let status = payload.reported_status();
            self.snapshot = reconcile::reconcile(&self.snapshot, &payload, &self.ctx);
            debug!(
                job_id = %self.job.job_id,
                status = ?status,
                percent = self.snapshot.percent,
                processed = self.snapshot.processed_count,
                total = self.snapshot.total_count,
                "Status reconciled"
            );

            if !self.emit_snapshot() {
                return Ending::Cancelled;
            }

            if status.is_terminal() {
                // The outcome is settled; cancelling now only skips the wait.
                self.pause(self.config.settle_delay).await;
                return Ending::Terminal(status, payload);
            }

            if !self.pause(self.config.poll_interval).await {
                return Ending::Cancelled;
            }
        }
    }

    /// One status query with its timeout, retried per the retry policy.
    async fn query(&self) -> Query {
        let timeout = self.config.request_timeout;
        let mut failures: u32 = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Query::Cancelled,
                result = tokio::time::timeout(timeout, self.rpc.get_discovery_status(&self.job.job_id)) => result,
            };

            let err = match result {
                Ok(Ok(payload)) => return Query::Payload(payload),
                Ok(Err(err)) => PollTransportError::from(err),
                Err(_) => PollTransportError::Timeout { after: timeout },
            };

            failures += 1;
            if !self.config.retry.allows_retry(failures) {
                return Query::Failed(err);
            }

            let delay = self.config.retry.delay(failures);
            warn!(
                job_id = %self.job.job_id,
                attempt = failures,
                delay_ms = delay.as_millis() as u64,
                "{err}, retrying"
            );
            if !self.pause(delay).await {
                return Query::Cancelled;
            }
        }
    }

    /// Sleeps for `duration`. Returns `false` if the job was cancelled meanwhile.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    /// Returns `false` once nobody listens anymore, which cancels the job.
    fn emit_snapshot(&self) -> bool {
        let delivered = self
            .events
            .send(DiscoveryEvent::Progress(self.snapshot.clone()))
            .is_ok();
        if !delivered {
            debug!(job_id = %self.job.job_id, "Event receiver dropped, stopping poller");
            self.cancel.cancel();
        }
        delivered
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
