//! # Progress Model
//!
//! What a caller of the discovery service observes: one [`ProgressSnapshot`]
//! per poll tick, then a single [`DiscoveryReport`] when the job ends.

use std::fmt;
use std::net::Ipv4Addr;

use crate::discovery::job::JobId;
use crate::discovery::payload::AgentProgress;
use crate::error::{BackendFailedError, PollTransportError};
use crate::network::range::IpRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    Starting,
    InProgress,
    Completed,
    Failed,
    Error,
}

impl SnapshotStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Error)
    }
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Starting => "starting",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Best-known progress of a job.
///
/// `percent`, `processed_count`, `discovered_count` and `failed_count` never
/// decrease between two snapshots of the same job.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub status: SnapshotStatus,
    /// 0 to 100.
    pub percent: u8,
    pub processed_count: u64,
    /// Never below 1.
    pub total_count: u64,
    pub discovered_count: u64,
    pub failed_count: u64,
    pub current_target: Option<Ipv4Addr>,
    pub message: String,
    /// Agent-reported errors, first occurrence order, without duplicates.
    pub errors: Vec<String>,
    pub agents: Vec<AgentProgress>,
    pub estimated_completion: Option<String>,
    /// Set once `total_count` came from the agent. It is fixed from then on.
    pub total_reported: bool,
}

impl ProgressSnapshot {
    /// The snapshot a freshly submitted job starts from.
    pub fn initial(range: &IpRange) -> Self {
        Self {
            status: SnapshotStatus::Starting,
            percent: 0,
            processed_count: 0,
            total_count: range.size().max(1),
            discovered_count: 0,
            failed_count: 0,
            current_target: Some(range.lower()),
            message: "Discovery starting".to_string(),
            errors: Vec::new(),
            agents: Vec::new(),
            estimated_completion: None,
            total_reported: false,
        }
    }
}

/// Final counts of a job. Produced exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscoverySummary {
    pub total_targets: u64,
    pub discovered_devices: u64,
    pub failed_devices: u64,
}

/// Why a job stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed(BackendFailedError),
    Error(PollTransportError),
    /// Stopped by the caller before the agent reached a terminal state.
    Cancelled,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Failed(err) => write!(f, "{err}"),
            Self::Error(err) => write!(f, "{err}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub job_id: JobId,
    pub outcome: JobOutcome,
    pub summary: DiscoverySummary,
}

/// Everything a running job emits. `Finished` is always the last event.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    Progress(ProgressSnapshot),
    Finished(DiscoveryReport),
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
