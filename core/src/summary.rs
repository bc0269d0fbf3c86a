//! # Final Summary
//!
//! Turns the way a job ended into its [`DiscoverySummary`].

use sweepr_common::config::FailureAccounting;
use sweepr_common::discovery::count::{coerce_count, strict_count};
use sweepr_common::discovery::payload::StatusPayload;
use sweepr_common::discovery::snapshot::{DiscoverySummary, ProgressSnapshot};

/// How a job ended, with the terminal payload when there is one.
#[derive(Debug, Clone, Copy)]
pub enum Termination<'a> {
    Completed(&'a StatusPayload),
    Failed(&'a StatusPayload),
    /// A status query timed out or failed.
    Error,
    Cancelled,
}

/// Computes the summary of a finished job.
///
/// * `last` - the final snapshot, if any was produced.
/// * `submitted_total` - the target count computed at submission.
pub fn summarize(
    termination: Termination<'_>,
    last: Option<&ProgressSnapshot>,
    submitted_total: u64,
    accounting: FailureAccounting,
) -> DiscoverySummary {
    let payload = match termination {
        Termination::Completed(payload) | Termination::Failed(payload) => Some(payload),
        Termination::Error | Termination::Cancelled => None,
    };
    let total_targets = best_total(payload, last, submitted_total);

    match termination {
        Termination::Completed(payload) => DiscoverySummary {
            total_targets,
            discovered_devices: final_count(
                [&payload.discovered_devices, &payload.devices_found],
                last.map(|s| s.discovered_count),
            ),
            failed_devices: final_count(
                [&payload.failed, &payload.failed_devices],
                last.map(|s| s.failed_count),
            ),
        },
        Termination::Failed(_) | Termination::Error => DiscoverySummary {
            total_targets,
            discovered_devices: 0,
            failed_devices: match accounting {
                FailureAccounting::SingleFailure => 1,
                FailureAccounting::WholeRange => total_targets.max(1),
            },
        },
        Termination::Cancelled => DiscoverySummary {
            total_targets,
            discovered_devices: last.map_or(0, |s| s.discovered_count),
            failed_devices: last.map_or(0, |s| s.failed_count),
        },
    }
}

/// Payload total, then the last snapshot's, then the submitted one, then 0.
fn best_total(
    payload: Option<&StatusPayload>,
    last: Option<&ProgressSnapshot>,
    submitted_total: u64,
) -> u64 {
    payload
        .and_then(|p| p.total_ips.as_ref())
        .and_then(strict_count)
        .filter(|total| *total > 0)
        .or_else(|| last.map(|s| s.total_count).filter(|total| *total > 0))
        .or_else(|| (submitted_total > 0).then_some(submitted_total))
        .unwrap_or(0)
}

/// First field that coerces to a count, never below what was already shown.
fn final_count(fields: [&Option<serde_json::Value>; 2], previous: Option<u64>) -> u64 {
    let reported = fields
        .into_iter()
        .find_map(|field| field.as_ref().and_then(coerce_count));

    match (reported, previous) {
        (Some(count), Some(prev)) => count.max(prev),
        (Some(count), None) => count,
        (None, prev) => prev.unwrap_or(0),
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
