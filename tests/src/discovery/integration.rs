#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use sweepr_common::config::Config;
use sweepr_common::discovery::request::DiscoveryRequest;
use sweepr_common::discovery::snapshot::{
    DiscoveryEvent, DiscoveryReport, DiscoverySummary, JobOutcome, ProgressSnapshot,
    SnapshotStatus,
};
use sweepr_common::error::{BackendFailedError, PollTransportError};
use sweepr_common::network::range::IpRange;
use sweepr_core::DiscoveryService;
use sweepr_core::agent::scripted::{ScriptStep, ScriptedAgent};

fn request(range: &str) -> DiscoveryRequest {
    DiscoveryRequest::new("net-1", range).with_agent("agent-a")
}

/// Runs one job to its end and returns every snapshot plus the final report.
async fn run_job(
    agent: Arc<ScriptedAgent>,
    range: &str,
) -> (Vec<ProgressSnapshot>, Vec<DiscoveryReport>) {
    let service = DiscoveryService::new(agent, Config::default());
    let mut handle = service
        .start_discovery(&request(range))
        .await
        .expect("job should be accepted");

    let mut snapshots = vec![handle.initial_snapshot().clone()];
    let mut reports = Vec::new();
    while let Some(event) = handle.next_event().await {
        match event {
            DiscoveryEvent::Progress(snapshot) => {
                assert!(reports.is_empty(), "progress emitted after the summary");
                snapshots.push(snapshot);
            }
            DiscoveryEvent::Finished(report) => reports.push(report),
        }
    }
    (snapshots, reports)
}

fn assert_monotonic(snapshots: &[ProgressSnapshot]) {
    for pair in snapshots.windows(2) {
        assert!(pair[1].percent >= pair[0].percent);
        assert!(pair[1].processed_count >= pair[0].processed_count);
        assert!(pair[1].discovered_count >= pair[0].discovered_count);
        assert!(pair[1].failed_count >= pair[0].failed_count);
    }
}

/// Range sizes for a same-subnet range and a single host.
#[test]
fn range_sizes() {
    let range: IpRange = "192.168.1.10-192.168.1.14".parse().unwrap();
    assert_eq!(range.size(), 5);

    let single: IpRange = "10.0.0.5-10.0.0.5".parse().unwrap();
    assert_eq!(single.size(), 1);

    let wide: IpRange = "10.0.0.250-10.0.1.4".parse().unwrap();
    assert_eq!(wide.size(), 11);
}

/// A healthy job: started, halfway, completed.
#[tokio::test(start_paused = true)]
async fn discovery_happy_path() {
    let agent = Arc::new(ScriptedAgent::from_payloads(
        "job-1",
        vec![
            json!({"status": "started"}),
            json!({"status": "in_progress", "processed_ips": 2, "total_ips": 5}),
            json!({"status": "completed", "discovered_devices": 3, "failed": 0}),
        ],
    ));
    let (snapshots, reports) = run_job(agent.clone(), "192.168.1.10-192.168.1.14").await;

    assert_monotonic(&snapshots);
    let last = snapshots.last().unwrap();
    assert_eq!(last.status, SnapshotStatus::Completed);
    assert_eq!(last.percent, 100);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, JobOutcome::Completed);
    assert_eq!(
        reports[0].summary,
        DiscoverySummary {
            total_targets: 5,
            discovered_devices: 3,
            failed_devices: 0
        }
    );

    let submitted = agent.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].start_ip, "192.168.1.10");
    assert_eq!(submitted[0].end_ip, "192.168.1.14");
    assert_eq!(submitted[0].snmp_community, "public");
}

/// The agent gives up on the job.
#[tokio::test(start_paused = true)]
async fn discovery_backend_failure() {
    let agent = Arc::new(ScriptedAgent::from_payloads(
        "job-2",
        vec![
            json!({"status": "started"}),
            json!({"status": "failed", "errors": ["scan aborted"]}),
        ],
    ));
    let (snapshots, reports) = run_job(agent, "192.168.1.10-192.168.1.14").await;

    let last = snapshots.last().unwrap();
    assert_eq!(last.status, SnapshotStatus::Failed);
    assert_eq!(last.errors, vec!["scan aborted".to_string()]);

    assert_eq!(
        reports[0].outcome,
        JobOutcome::Failed(BackendFailedError {
            errors: vec!["scan aborted".into()]
        })
    );
    assert_eq!(reports[0].summary.discovered_devices, 0);
    assert_eq!(reports[0].summary.failed_devices, 1);
}

/// A status query that never answers ends the job and nothing is queried after.
#[tokio::test(start_paused = true)]
async fn discovery_status_timeout() {
    let agent = Arc::new(ScriptedAgent::new(
        "job-3",
        vec![
            ScriptStep::json(json!({"status": "in_progress", "processed_ips": 1})),
            ScriptStep::Stall,
            ScriptStep::json(json!({"status": "completed"})),
        ],
    ));
    let (snapshots, reports) = run_job(agent.clone(), "10.0.0.1-10.0.0.4").await;

    assert_eq!(snapshots.last().unwrap().status, SnapshotStatus::Error);
    assert!(matches!(
        reports[0].outcome,
        JobOutcome::Error(PollTransportError::Timeout { .. })
    ));
    assert_eq!(reports[0].summary.failed_devices, 1);
    assert_eq!(reports[0].summary.discovered_devices, 0);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(agent.status_queries(), 2);
    assert_eq!(agent.remaining_steps(), 1);
}

/// Device lists count by length.
#[tokio::test(start_paused = true)]
async fn discovery_counts_device_lists() {
    let agent = Arc::new(ScriptedAgent::from_payloads(
        "job-4",
        vec![
            json!({"status": "in_progress", "discovered_devices": [{"ip": "10.0.0.2"}, {"ip": "10.0.0.3"}]}),
            json!({"status": "completed"}),
        ],
    ));
    let (snapshots, reports) = run_job(agent, "10.0.0.1-10.0.0.4").await;

    assert_eq!(snapshots[1].discovered_count, 2);
    assert_eq!(reports[0].summary.discovered_devices, 2);
}

/// Without any reported total the submitted range size is kept throughout.
#[tokio::test(start_paused = true)]
async fn discovery_keeps_fallback_total() {
    let payloads: Vec<Value> = vec![
        json!({"status": "started"}),
        json!({"status": "in_progress", "processed_ips": 1}),
        json!({"status": "in_progress", "scanned_ips": 3, "current_ip": "192.168.1.12"}),
        json!({"status": "in_progress", "processed_ips": 2}),
        json!({"status": "completed"}),
    ];
    let agent = Arc::new(ScriptedAgent::from_payloads("job-5", payloads));
    let (snapshots, reports) = run_job(agent, "192.168.1.10-192.168.1.14").await;

    assert_monotonic(&snapshots);
    assert!(snapshots.iter().all(|s| s.total_count == 5));
    assert_eq!(snapshots[2].percent, 20);
    assert_eq!(snapshots[3].percent, 60);
    assert_eq!(snapshots[4].percent, 60);
    assert_eq!(reports[0].summary.total_targets, 5);
}

/// Two jobs share an agent but not their progress.
#[tokio::test(start_paused = true)]
async fn discovery_jobs_are_independent() {
    let first = Arc::new(ScriptedAgent::from_payloads(
        "job-a",
        vec![
            json!({"status": "in_progress", "processed_ips": 1}),
            json!({"status": "completed", "devices_found": 1}),
        ],
    ));
    let second = Arc::new(ScriptedAgent::from_payloads(
        "job-b",
        vec![json!({"status": "failed", "errors": "agent offline"})],
    ));

    let (a, b) = tokio::join!(
        run_job(first, "10.0.0.1-10.0.0.2"),
        run_job(second, "10.0.1.1-10.0.1.8")
    );

    assert_eq!(a.1[0].outcome, JobOutcome::Completed);
    assert_eq!(a.1[0].summary.total_targets, 2);
    assert!(matches!(b.1[0].outcome, JobOutcome::Failed(_)));
    assert_eq!(b.1[0].summary.total_targets, 8);
}
