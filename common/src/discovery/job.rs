use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::discovery::request::{Credentials, DiscoveryMethod};
use crate::network::range::IpRange;

/// Identifier the agent assigned to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job accepted by an agent. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryJob {
    pub job_id: JobId,
    pub network_id: String,
    pub range: IpRange,
    pub agent_ids: BTreeSet<String>,
    pub credentials: Credentials,
    pub method: DiscoveryMethod,
    /// Target count computed from `range` at submission.
    pub total_targets: u64,
}
