use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use crate::commands::discover;
use sweepr_common::config::Config;
use sweepr_common::discovery::request::DiscoveryRequest;
use sweepr_common::info;
use sweepr_common::network::range::IpRange;
use sweepr_core::agent::scripted::ScriptedAgent;

const REPLAY_NETWORK: &str = "replay";
const REPLAY_AGENT: &str = "replay-agent";

pub async fn replay(file: &Path, range: IpRange, cfg: &Config) -> anyhow::Result<()> {
    let payloads = load_payloads(file)?;
    info!("Replaying {} status payloads from {}", payloads.len(), file.display());

    let agent = ScriptedAgent::from_payloads("replay", payloads);
    let request = DiscoveryRequest::new(REPLAY_NETWORK, range.to_string()).with_agent(REPLAY_AGENT);

    discover::follow(Arc::new(agent), &request, cfg).await
}

fn load_payloads(file: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let payloads: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of status payloads", file.display()))?;
    Ok(payloads)
}
