use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::bail;
use colored::*;

use crate::commands::DiscoverArgs;
use crate::{mprint, terminal::{colors, format, print, progress::ProgressView}};
use sweepr_common::config::Config;
use sweepr_common::discovery::request::{
    Credentials, DiscoveryRequest, SnmpParams, SnmpV3Config, SnmpVersion,
};
use sweepr_common::discovery::snapshot::{DiscoveryEvent, DiscoveryReport, JobOutcome, ProgressSnapshot};
use sweepr_common::rpc::DiscoveryRpc;
use sweepr_common::{success, warn};
use sweepr_core::DiscoveryService;
use sweepr_core::agent::http::HttpAgent;

pub async fn discover(args: DiscoverArgs, cfg: &Config) -> anyhow::Result<()> {
    let mut agent = HttpAgent::new(&args.agent_url);
    if let Some(token) = &args.token {
        agent = agent.with_token(token);
    }

    let request = build_request(&args);
    follow(Arc::new(agent), &request, cfg).await
}

fn build_request(args: &DiscoverArgs) -> DiscoveryRequest {
    let mut request = DiscoveryRequest::new(&args.network, &args.range)
        .with_method(args.method)
        .with_credentials(Credentials::new(&args.username, args.password.as_str()))
        .with_snmp(SnmpParams {
            version: args.snmp_version,
            community: args.snmp_community.clone(),
            port: args.snmp_port,
            v3: match args.snmp_version {
                SnmpVersion::V3 => Some(SnmpV3Config {
                    username: args.snmp_user.clone().unwrap_or_default(),
                    ..SnmpV3Config::default()
                }),
                SnmpVersion::V2c => None,
            },
        });

    for agent in &args.agents {
        request = request.with_agent(agent);
    }
    request
}

/// Submits `request`, renders its progress and prints the final report.
///
/// Ctrl-C cancels the job. Returns an error when the job failed.
pub async fn follow(
    rpc: Arc<dyn DiscoveryRpc>,
    request: &DiscoveryRequest,
    cfg: &Config,
) -> anyhow::Result<()> {
    let service = DiscoveryService::new(rpc, cfg.clone());
    let start_time: Instant = Instant::now();
    let mut handle = service.start_discovery(request).await?;

    print_job(&handle.job().range.to_string(), handle.initial_snapshot(), cfg);

    let view = (cfg.quiet < 2).then(|| ProgressView::start(handle.job(), handle.initial_snapshot()));

    let cancel = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling discovery");
            cancel.cancel();
        }
    });

    let mut last = handle.initial_snapshot().clone();
    while let Some(event) = handle.next_event().await {
        match event {
            DiscoveryEvent::Progress(snapshot) => {
                if let Some(view) = &view {
                    view.update(&snapshot);
                }
                last = snapshot;
            }
            DiscoveryEvent::Finished(_) => break,
        }
    }

    interrupt.abort();
    drop(view);

    let report = handle.wait().await;
    discovery_ends(&report, &last, start_time.elapsed(), cfg);

    match &report.outcome {
        JobOutcome::Completed | JobOutcome::Cancelled => Ok(()),
        JobOutcome::Failed(err) => bail!("{err}"),
        JobOutcome::Error(err) => bail!("{err}"),
    }
}

fn print_job(range: &str, initial: &ProgressSnapshot, cfg: &Config) {
    print::header("discovery job", cfg.quiet);
    if cfg.quiet > 0 {
        return;
    }
    print::set_key_width(["Range", "Targets"]);
    print::aligned_line("Range", range.color(colors::IPV4_ADDR));
    print::aligned_line("Targets", initial.total_count.to_string());
    print::separator(false);
}

fn discovery_ends(report: &DiscoveryReport, last: &ProgressSnapshot, total_time: Duration, cfg: &Config) {
    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("discovery summary", cfg.quiet);

    if cfg.quiet == 0 && !last.agents.is_empty() {
        for (idx, (name, status)) in format::agents_to_details(last).into_iter().enumerate() {
            print::tree(Some((idx, name.as_str())), vec![("Status".to_string(), status)]);
        }
        mprint!();
    }

    if cfg.quiet < 2 {
        let mut details = format::report_to_details(report, total_time);
        details.insert(2, ("Status".to_string(), format::status_to_colored(last.status)));
        print::tree(None, details);
    }

    let found: ColoredString = format!("{} devices", report.summary.discovered_devices).bold().green();
    let elapsed: String = format!("{:.2}s", total_time.as_secs_f64());
    let label = format::outcome_label(&report.outcome);
    let output = format!(
        "Discovery {label}: {found} found in {}",
        elapsed.bold().yellow()
    );

    match (&report.outcome, cfg.quiet) {
        (JobOutcome::Completed, 0) => {
            let plain = format!(
                "Discovery {label}: {} devices found in {elapsed}",
                report.summary.discovered_devices
            );
            print::separator(true);
            print::centerln(&output.color(colors::TEXT_DEFAULT).to_string(), plain.chars().count());
            print::separator(true);
        }
        (JobOutcome::Completed, _) => success!("{}", output),
        _ => mprint!(&output),
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
