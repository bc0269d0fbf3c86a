#![cfg(test)]
//! The HTTP agent against a local fake agent speaking plain HTTP/1.1.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use sweepr_common::config::Config;
use sweepr_common::discovery::request::DiscoveryRequest;
use sweepr_common::discovery::snapshot::{DiscoveryEvent, JobOutcome};
use sweepr_common::error::{DiscoveryError, TransportError};
use sweepr_core::DiscoveryService;
use sweepr_core::agent::http::HttpAgent;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Requests seen by the fake agent, as `(method line, body)`.
type Seen = Arc<Mutex<Vec<(String, String)>>>;

struct FakeAgent {
    addr: SocketAddr,
    seen: Seen,
}

impl FakeAgent {
    /// Answers the submit with `submit` and status queries from `statuses` in order.
    async fn spawn(submit: (u16, Value), statuses: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen: Seen = Arc::default();
        let statuses = Arc::new(Mutex::new(VecDeque::from(statuses)));

        let log = seen.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let log = log.clone();
                let statuses = statuses.clone();
                let submit = submit.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, log, statuses, submit).await;
                });
            }
        });

        Self { addr, seen }
    }

    fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    log: Seen,
    statuses: Arc<Mutex<VecDeque<Value>>>,
    submit: (u16, Value),
) -> std::io::Result<()> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    let (head, body) = loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        raw.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let head = text[..split].to_string();
            let length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if raw.len() >= split + 4 + length {
                let body = String::from_utf8_lossy(&raw[split + 4..split + 4 + length]).to_string();
                break (head, body);
            }
        }
    };

    let request_line = head.lines().next().unwrap_or_default().to_string();
    log.lock().unwrap().push((request_line.clone(), body));

    let (status, payload) = if request_line.starts_with("POST /api/discovery/start") {
        submit
    } else if request_line.starts_with("GET /api/discovery/status/") {
        match statuses.lock().unwrap().pop_front() {
            Some(payload) => (200, payload),
            None => (503, json!({"error": "no more statuses"})),
        }
    } else {
        (404, json!({"error": "not found"}))
    };

    let body = payload.to_string();
    let response = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Talks to the fake agent directly, whatever proxy the environment sets.
fn agent(fake: &FakeAgent) -> HttpAgent {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpAgent::with_client(client, fake.base_url())
}

fn fast_config() -> Config {
    Config {
        poll_interval: Duration::from_millis(10),
        settle_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

/// A whole job over HTTP with a numeric job id and a progress sequence.
#[tokio::test]
async fn http_agent_runs_a_job() {
    let fake = FakeAgent::spawn(
        (200, json!({"jobId": 42})),
        vec![
            json!({"status": "started"}),
            json!({"status": "in_progress", "processed_ips": 3, "total_ips": 4, "current_ip": "10.1.0.3"}),
            json!({"status": "completed", "devices_found": ["a", "b"]}),
        ],
    )
    .await;

    let http = agent(&fake).with_token("secret-token");
    let service = DiscoveryService::new(Arc::new(http), fast_config());
    let request = DiscoveryRequest::new("net-7", "10.1.0.1-4").with_agent("edge-1");

    let mut handle = service.start_discovery(&request).await.unwrap();
    assert_eq!(handle.job().job_id.as_str(), "42");

    let mut percents = Vec::new();
    while let Some(event) = handle.next_event().await {
        if let DiscoveryEvent::Progress(snapshot) = event {
            percents.push(snapshot.percent);
        }
    }
    assert_eq!(percents, vec![10, 75, 100]);

    let report = handle.wait().await;
    assert_eq!(report.outcome, JobOutcome::Completed);
    assert_eq!(report.summary.discovered_devices, 2);
    assert_eq!(report.summary.total_targets, 4);

    let seen = fake.seen();
    assert_eq!(seen.len(), 4);
    assert!(seen[0].0.starts_with("POST /api/discovery/start"));
    let submitted: Value = serde_json::from_str(&seen[0].1).unwrap();
    assert_eq!(submitted["network_id"], "net-7");
    assert_eq!(submitted["agent_ids"], json!(["edge-1"]));
    assert_eq!(submitted["start_ip"], "10.1.0.1");
    assert_eq!(submitted["end_ip"], "10.1.0.4");
    assert_eq!(submitted["snmp_port"], 161);
    assert!(seen[1..].iter().all(|(line, _)| line.starts_with("GET /api/discovery/status/42")));
}

/// A rejected submission surfaces as a submission error with the status code.
#[tokio::test]
async fn http_agent_rejected_submission() {
    let fake = FakeAgent::spawn((400, json!({"error": "unknown network"})), vec![]).await;

    let service = DiscoveryService::new(Arc::new(agent(&fake)), fast_config());
    let request = DiscoveryRequest::new("net-x", "10.1.0.1").with_agent("edge-1");

    let err = service.start_discovery(&request).await.unwrap_err();
    match err {
        DiscoveryError::Submission(err) => {
            assert!(matches!(err.0, TransportError::Status { status: 400, .. }))
        }
        other => panic!("expected a submission error, got {other:?}"),
    }
    assert_eq!(fake.seen().len(), 1);
}

/// An agent that stops answering status queries ends the job in error.
#[tokio::test]
async fn http_agent_lost_mid_job() {
    let fake = FakeAgent::spawn(
        (200, json!({"job_id": "j-1"})),
        vec![json!({"status": "in_progress", "processed_ips": 1})],
    )
    .await;

    let service = DiscoveryService::new(Arc::new(agent(&fake)), fast_config());
    let request = DiscoveryRequest::new("net-7", "10.1.0.1-10.1.0.2").with_agent("edge-1");

    let report = service.run_discovery(&request, |_| {}).await.unwrap();
    assert!(matches!(report.outcome, JobOutcome::Error(_)));
    assert_eq!(report.summary.failed_devices, 1);
    assert_eq!(fake.seen().len(), 3);
}

/// A job id with URL metacharacters stays a single path segment.
#[tokio::test]
async fn http_agent_encodes_job_id() {
    let fake = FakeAgent::spawn(
        (200, json!({"job_id": "scan/7?x=1"})),
        vec![json!({"status": "completed", "discovered_devices": 1})],
    )
    .await;

    let service = DiscoveryService::new(Arc::new(agent(&fake)), fast_config());
    let request = DiscoveryRequest::new("net-7", "10.1.0.1").with_agent("edge-1");

    let report = service.run_discovery(&request, |_| {}).await.unwrap();
    assert_eq!(report.job_id.as_str(), "scan/7?x=1");
    assert_eq!(report.outcome, JobOutcome::Completed);

    let seen = fake.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].0, "GET /api/discovery/status/scan%2F7%3Fx=1 HTTP/1.1");
}
