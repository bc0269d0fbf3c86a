use crate::terminal::colors;
use colored::*;
use std::time::Duration;
use sweepr_common::discovery::snapshot::{
    DiscoveryReport, JobOutcome, ProgressSnapshot, SnapshotStatus,
};

type Detail = (String, ColoredString);

pub fn status_to_colored(status: SnapshotStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        SnapshotStatus::Starting => text.color(colors::ACCENT),
        SnapshotStatus::InProgress => text.color(colors::PRIMARY),
        SnapshotStatus::Completed => text.color(colors::SUCCESS).bold(),
        SnapshotStatus::Failed | SnapshotStatus::Error => text.color(colors::FAILURE).bold(),
    }
}

pub fn outcome_label(outcome: &JobOutcome) -> &'static str {
    match outcome {
        JobOutcome::Completed => "completed",
        JobOutcome::Failed(_) => "failed",
        JobOutcome::Error(_) => "lost",
        JobOutcome::Cancelled => "cancelled",
    }
}

pub fn outcome_to_colored(outcome: &JobOutcome) -> ColoredString {
    let text = outcome.to_string();
    match outcome {
        JobOutcome::Completed => text.color(colors::SUCCESS).bold(),
        JobOutcome::Cancelled => text.color(colors::ACCENT).bold(),
        JobOutcome::Failed(_) | JobOutcome::Error(_) => text.color(colors::FAILURE).bold(),
    }
}

/// Message shown next to the progress bar.
pub fn snapshot_message(snapshot: &ProgressSnapshot) -> String {
    let mut message = snapshot.message.clone();
    if snapshot.discovered_count > 0 {
        message.push_str(&format!(" | {} found", snapshot.discovered_count));
    }
    if snapshot.failed_count > 0 {
        message.push_str(&format!(" | {} failed", snapshot.failed_count));
    }
    if let Some(eta) = &snapshot.estimated_completion {
        message.push_str(&format!(" | eta {eta}"));
    }
    message
}

pub fn report_to_details(report: &DiscoveryReport, elapsed: Duration) -> Vec<Detail> {
    let summary = &report.summary;
    vec![
        ("Job".to_string(), report.job_id.to_string().color(colors::PRIMARY)),
        ("Outcome".to_string(), outcome_to_colored(&report.outcome)),
        ("Targets".to_string(), summary.total_targets.to_string().normal()),
        (
            "Found".to_string(),
            summary.discovered_devices.to_string().color(colors::SUCCESS),
        ),
        (
            "Failed".to_string(),
            summary.failed_devices.to_string().color(colors::FAILURE),
        ),
        (
            "Time".to_string(),
            format!("{:.2}s", elapsed.as_secs_f64()).yellow(),
        ),
    ]
}

pub fn agents_to_details(snapshot: &ProgressSnapshot) -> Vec<Detail> {
    snapshot
        .agents
        .iter()
        .map(|agent| {
            let name = agent
                .agent_name
                .clone()
                .or_else(|| agent.agent_id.clone())
                .unwrap_or_else(|| "agent".to_string());
            let progress = agent
                .progress
                .map_or_else(|| "-".to_string(), |p| format!("{p:.0}%"));
            let status = agent.status.as_deref().unwrap_or("unknown");
            (name, format!("{status} ({progress})").color(colors::TEXT_DEFAULT))
        })
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_message_appends_counts() {
        let range = "10.0.0.1-3".parse().unwrap();
        let mut snapshot = ProgressSnapshot::initial(&range);
        assert_eq!(snapshot_message(&snapshot), snapshot.message);

        snapshot.discovered_count = 2;
        snapshot.estimated_completion = Some("5m".into());
        let message = snapshot_message(&snapshot);
        assert!(message.ends_with(" | 2 found | eta 5m"));
        assert!(!message.contains("failed"));
    }
}
