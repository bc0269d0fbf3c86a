//! # Progress Reconciliation
//!
//! Merges one raw status payload into the previous snapshot of a job. Each
//! field is resolved through its ordered strategy list (see [`strategy`]),
//! then the counters are forced to be monotonic so that late or regressive
//! reports never move visible progress backwards.

pub mod strategy;

use sweepr_common::discovery::job::DiscoveryJob;
use sweepr_common::discovery::payload::{ReportedStatus, StatusPayload};
use sweepr_common::discovery::snapshot::{ProgressSnapshot, SnapshotStatus};
use sweepr_common::network::range::IpRange;

use strategy::{FieldInput, Resolved, first_match};

/// Job facts the payload cannot be trusted to repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileContext {
    /// Target count computed at submission.
    pub original_total: u64,
    pub range: Option<IpRange>,
}

impl ReconcileContext {
    pub fn for_job(job: &DiscoveryJob) -> Self {
        Self {
            original_total: job.total_targets,
            range: Some(job.range),
        }
    }
}

/// Produces the next snapshot of a job from the previous one and a payload.
///
/// A snapshot that is already terminal is returned unchanged.
pub fn reconcile(
    prev: &ProgressSnapshot,
    payload: &StatusPayload,
    ctx: &ReconcileContext,
) -> ProgressSnapshot {
    if prev.status.is_terminal() {
        return prev.clone();
    }

    let status = payload.reported_status();
    let mut input = FieldInput {
        prev,
        payload,
        status,
        ctx,
        resolved: Resolved::default(),
    };

    let processed = first_match(strategy::PROCESSED, &input);
    let processed_reported = processed.is_some_and(|hit| hit.source != "previous");
    let processed_count = processed
        .map_or(prev.processed_count, |hit| hit.value)
        .max(prev.processed_count);

    let total = first_match(strategy::TOTAL, &input).map(|hit| hit.value);
    let (total_count, total_reported) =
        total.map_or((prev.total_count.max(1), prev.total_reported), |t| {
            (t.value.max(1), t.reported)
        });

    input.resolved = Resolved {
        processed: processed_count,
        processed_reported,
        total: total_count,
    };

    let percent = first_match(strategy::PERCENT, &input)
        .map_or(prev.percent, |hit| hit.value)
        .min(100)
        .max(prev.percent);

    let discovered_count = first_match(strategy::DISCOVERED, &input)
        .map_or(prev.discovered_count, |hit| hit.value)
        .max(prev.discovered_count);

    let failed_count = first_match(strategy::FAILED, &input)
        .map_or(prev.failed_count, |hit| hit.value)
        .max(prev.failed_count);

    let current_target = first_match(strategy::CURRENT_TARGET, &input)
        .map(|hit| hit.value)
        .or(prev.current_target);

    let mut errors = prev.errors.clone();
    for err in payload.errors() {
        if !errors.contains(&err) {
            errors.push(err);
        }
    }

    let mut next = ProgressSnapshot {
        status: next_status(prev.status, status, processed_count),
        percent,
        processed_count,
        total_count,
        discovered_count,
        failed_count,
        current_target,
        message: String::new(),
        errors,
        agents: payload.agent_progress().unwrap_or_else(|| prev.agents.clone()),
        estimated_completion: payload
            .estimated_completion()
            .or_else(|| prev.estimated_completion.clone()),
        total_reported,
    };
    next.message = describe(&next);
    next
}

fn next_status(prev: SnapshotStatus, reported: ReportedStatus, processed: u64) -> SnapshotStatus {
    match reported {
        ReportedStatus::Completed => SnapshotStatus::Completed,
        ReportedStatus::Failed => SnapshotStatus::Failed,
        ReportedStatus::InProgress => SnapshotStatus::InProgress,
        ReportedStatus::Started if prev == SnapshotStatus::InProgress => prev,
        ReportedStatus::Started => SnapshotStatus::Starting,
        ReportedStatus::Other if prev == SnapshotStatus::Starting && processed > 0 => {
            SnapshotStatus::InProgress
        }
        ReportedStatus::Other => prev,
    }
}

/// Human-readable line for a snapshot. Carries no control-flow meaning.
pub fn describe(snapshot: &ProgressSnapshot) -> String {
    match snapshot.status {
        SnapshotStatus::Starting => format!(
            "Starting discovery of {} addresses ({}%)",
            snapshot.total_count, snapshot.percent
        ),
        SnapshotStatus::InProgress => match snapshot.current_target {
            Some(ip) => format!("Scanning {ip} ({}%)", snapshot.percent),
            None => format!("Scanning ({}%)", snapshot.percent),
        },
        SnapshotStatus::Completed => format!(
            "Discovery completed: {} devices found",
            snapshot.discovered_count
        ),
        SnapshotStatus::Failed => match snapshot.errors.last() {
            Some(err) => format!("Discovery failed: {err}"),
            None => "Discovery failed".to_string(),
        },
        SnapshotStatus::Error => "Lost contact with the discovery agent".to_string(),
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
