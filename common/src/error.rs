//! # Error Taxonomy
//!
//! Only [`DiscoveryError`] ever reaches a caller of the discovery service.
//! Once a job has been submitted, poll failures and backend failures are
//! folded into the job's terminal outcome instead of being returned.

use std::time::Duration;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to parse an address range.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("range cannot be empty")]
    Empty,

    #[error("invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid end of range '{input}': {reason}")]
    InvalidEnd { input: String, reason: String },

    #[error("invalid CIDR prefix '{input}'")]
    InvalidPrefix { input: String },
}

/// Input rejected before any job was created.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no network selected")]
    MissingNetwork,

    #[error("at least one agent must be selected")]
    NoAgents,

    #[error("no address range given")]
    MissingRange,

    #[error("address range is invalid: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("SNMP v3 requires a username")]
    SnmpV3Username,
}

/// What an agent adapter raises when a request cannot be completed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    #[error("agent responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode agent response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Script(String),
}

/// The job could not be handed to the agent. Polling never starts.
#[derive(Debug, Error)]
#[error("failed to submit discovery job: {0}")]
pub struct SubmissionError(#[source] pub TransportError);

/// Errors returned when starting a discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// A status query timed out or failed in transport.
///
/// Kept as plain data so it can travel inside a job outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollTransportError {
    #[error("status query timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("status query failed: {message}")]
    Transport { message: String },
}

impl From<TransportError> for PollTransportError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(after) => Self::Timeout { after },
            other => Self::Transport {
                message: other.to_string(),
            },
        }
    }
}

/// The agent reported the whole job as failed.
#[derive(Debug, Clone, Error, PartialEq, Eq, Default)]
#[error("agent reported the discovery as failed{}", render_errors(.errors))]
pub struct BackendFailedError {
    pub errors: Vec<String>,
}

fn render_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", errors.join("; "))
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
