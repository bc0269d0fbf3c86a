//! # Agent Status Payload
//!
//! The status document returned by a scanning agent. Every field is optional
//! and its shape varies across agent versions, so fields are kept as raw JSON
//! and interpreted by the reconciler. Deserializing a JSON object into a
//! [`StatusPayload`] never fails because of a field's shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::discovery::count;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub status: Option<Value>,
    pub progress: Option<Value>,
    pub processed_ips: Option<Value>,
    pub scanned_ips: Option<Value>,
    pub total_ips: Option<Value>,
    pub current_ip: Option<Value>,
    pub current_ip_address: Option<Value>,
    pub scanning_ip: Option<Value>,
    pub discovered_devices: Option<Value>,
    pub devices_found: Option<Value>,
    pub failed: Option<Value>,
    pub failed_devices: Option<Value>,
    pub errors: Option<Value>,
    pub agent_progress: Option<Value>,
    pub estimated_completion: Option<Value>,
}

/// The agent's status, reduced to what the poller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedStatus {
    Completed,
    Failed,
    InProgress,
    Started,
    Other,
}

impl ReportedStatus {
    /// Case-insensitive classification. `starting` counts as `started`.
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Other;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "in_progress" => Self::InProgress,
            "started" | "starting" => Self::Started,
            _ => Self::Other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Progress of one agent participating in a job, as reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentProgress {
    pub agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub status: Option<String>,
    pub progress: Option<f64>,
}

impl StatusPayload {
    /// Builds a payload from any JSON value. Non-objects give an empty payload.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().and_then(Value::as_str)
    }

    pub fn reported_status(&self) -> ReportedStatus {
        ReportedStatus::classify(self.status_text())
    }

    /// Error strings reported by the agent. A lone string is accepted too.
    pub fn errors(&self) -> Vec<String> {
        match &self.errors {
            Some(Value::Array(items)) => items.iter().filter_map(text).collect(),
            Some(value) => text(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Per-agent progress, or `None` when the agent sent no list.
    pub fn agent_progress(&self) -> Option<Vec<AgentProgress>> {
        let Some(Value::Array(items)) = &self.agent_progress else {
            return None;
        };

        let agents = items
            .iter()
            .filter_map(Value::as_object)
            .map(|entry| AgentProgress {
                agent_id: entry.get("agent_id").and_then(text),
                agent_name: entry.get("agent_name").and_then(text),
                status: entry.get("status").and_then(text),
                progress: entry.get("progress").and_then(count::number),
            })
            .collect();
        Some(agents)
    }

    pub fn estimated_completion(&self) -> Option<String> {
        self.estimated_completion.as_ref().and_then(text)
    }
}

/// Strings as-is, numbers rendered, everything else dropped.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
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
