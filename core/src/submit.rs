//! # Job Submission
//!
//! Validates a [`DiscoveryRequest`], sizes its range and hands it to the
//! agent. Nothing is sent when validation fails.

use std::sync::Arc;
use std::time::Duration;

use sweepr_common::discovery::job::DiscoveryJob;
use sweepr_common::discovery::request::{
    DiscoveryRequest, SnmpParams, SnmpVersion, SubmitDiscoveryRequest,
};
use sweepr_common::discovery::snapshot::ProgressSnapshot;
use sweepr_common::error::{DiscoveryError, SubmissionError, TransportError, ValidationError};
use sweepr_common::network::range::IpRange;
use sweepr_common::rpc::DiscoveryRpc;
use sweepr_common::{info, warn};

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub network_id: String,
    pub range: IpRange,
    pub request: DiscoveryRequest,
}

/// A job the agent accepted, with the snapshot its progress starts from.
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub job: DiscoveryJob,
    pub snapshot: ProgressSnapshot,
}

pub fn validate(request: &DiscoveryRequest) -> Result<ValidatedRequest, ValidationError> {
    let network_id = request
        .network_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ValidationError::MissingNetwork)?;

    if request.agent_ids.iter().all(|id| id.trim().is_empty()) {
        return Err(ValidationError::NoAgents);
    }

    let range: IpRange = request
        .range
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .ok_or(ValidationError::MissingRange)?
        .parse()?;

    if let Some(SnmpParams {
        version: SnmpVersion::V3,
        v3,
        ..
    }) = &request.snmp
    {
        let has_user = v3.as_ref().is_some_and(|cfg| !cfg.username.trim().is_empty());
        if !has_user {
            return Err(ValidationError::SnmpV3Username);
        }
    }

    Ok(ValidatedRequest {
        network_id: network_id.to_string(),
        range,
        request: request.clone(),
    })
}

/// Builds the agent request body for a validated request.
pub fn wire_request(validated: &ValidatedRequest) -> SubmitDiscoveryRequest {
    let request = &validated.request;
    let snmp = request.snmp.clone().unwrap_or_default();

    SubmitDiscoveryRequest {
        network_id: validated.network_id.clone(),
        agent_ids: request
            .agent_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
        start_ip: validated.range.start_addr.to_string(),
        end_ip: validated.range.end_addr.to_string(),
        discovery_method: request.method,
        snmp_version: snmp.version,
        snmp_community: snmp.community,
        snmp_port: snmp.port,
        snmp_config: match snmp.version {
            SnmpVersion::V3 => snmp.v3,
            SnmpVersion::V2c => None,
        },
        credentials: request.credentials.clone(),
        location: request.location.clone(),
        device_type: request.device_type.clone(),
        is_auto_discovery: request.is_auto_discovery,
    }
}

pub struct DiscoverySubmitter {
    rpc: Arc<dyn DiscoveryRpc>,
    request_timeout: Duration,
}

impl DiscoverySubmitter {
    pub fn new(rpc: Arc<dyn DiscoveryRpc>, request_timeout: Duration) -> Self {
        Self {
            rpc,
            request_timeout,
        }
    }

    /// Validates and submits a request.
    ///
    /// On success the returned snapshot is `Starting` at 0% with the range's
    /// size as total and the range start as current target.
    pub async fn submit(&self, request: &DiscoveryRequest) -> Result<SubmittedJob, DiscoveryError> {
        let validated = validate(request)?;
        let range = validated.range;

        if range.is_reversed() {
            warn!("Range {range} is reversed, sizing it by absolute difference");
        }

        let total_targets = range.size();
        let body = wire_request(&validated);

        let job_id = tokio::time::timeout(self.request_timeout, self.rpc.submit_discovery(&body))
            .await
            .map_err(|_| TransportError::Timeout(self.request_timeout))
            .and_then(|result| result)
            .map_err(SubmissionError)?;

        info!(
            job_id = %job_id,
            network_id = %validated.network_id,
            targets = total_targets,
            "Discovery job submitted for {range}"
        );

        let job = DiscoveryJob {
            job_id,
            network_id: validated.network_id,
            range,
            agent_ids: body.agent_ids.iter().cloned().collect(),
            credentials: request.credentials.clone(),
            method: request.method,
            total_targets,
        };

        Ok(SubmittedJob {
            snapshot: ProgressSnapshot::initial(&job.range),
            job,
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::scripted::{ScriptStep, ScriptedAgent};
    use std::net::Ipv4Addr;
    use sweepr_common::discovery::request::{Credentials, DiscoveryMethod, SnmpV3Config};
    use sweepr_common::discovery::snapshot::SnapshotStatus;
    use sweepr_common::error::RangeError;

    fn request() -> DiscoveryRequest {
        DiscoveryRequest::new("net-1", "192.168.1.10-192.168.1.14")
            .with_agent("agent-a")
            .with_method(DiscoveryMethod::SnmpOnly)
            .with_credentials(Credentials::new("admin", "hunter2"))
    }

    fn submitter(agent: &Arc<ScriptedAgent>) -> DiscoverySubmitter {
        DiscoverySubmitter::new(agent.clone(), Duration::from_secs(10))
    }

    #[test]
    fn validation_rejects_missing_parts() {
        let mut req = request();
        req.network_id = Some("  ".into());
        assert_eq!(validate(&req).unwrap_err(), ValidationError::MissingNetwork);

        let mut req = request();
        req.agent_ids.clear();
        assert_eq!(validate(&req).unwrap_err(), ValidationError::NoAgents);

        let mut req = request();
        req.range = None;
        assert_eq!(validate(&req).unwrap_err(), ValidationError::MissingRange);

        let mut req = request();
        req.range = Some("192.168.1.300".into());
        assert!(matches!(
            validate(&req).unwrap_err(),
            ValidationError::InvalidRange(RangeError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn snmp_v3_needs_a_user() {
        let req = request().with_snmp(SnmpParams {
            version: SnmpVersion::V3,
            ..Default::default()
        });
        assert_eq!(validate(&req).unwrap_err(), ValidationError::SnmpV3Username);

        let req = request().with_snmp(SnmpParams {
            version: SnmpVersion::V3,
            v3: Some(SnmpV3Config {
                username: "monitor".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        let wire = wire_request(&validate(&req).unwrap());
        assert_eq!(wire.snmp_config.unwrap().username, "monitor");
    }

    #[test]
    fn wire_request_defaults_snmp() {
        let wire = wire_request(&validate(&request()).unwrap());
        assert_eq!(wire.start_ip, "192.168.1.10");
        assert_eq!(wire.end_ip, "192.168.1.14");
        assert_eq!(wire.snmp_version, SnmpVersion::V2c);
        assert_eq!(wire.snmp_community, "public");
        assert_eq!(wire.snmp_port, 161);
        assert!(wire.snmp_config.is_none());
        assert_eq!(wire.agent_ids, vec!["agent-a".to_string()]);
    }

    #[tokio::test]
    async fn submit_initializes_progress() {
        let agent = Arc::new(ScriptedAgent::new("job-7", Vec::new()));
        let submitted = submitter(&agent).submit(&request()).await.unwrap();

        assert_eq!(submitted.job.job_id.as_str(), "job-7");
        assert_eq!(submitted.job.total_targets, 5);

        let snapshot = submitted.snapshot;
        assert_eq!(snapshot.status, SnapshotStatus::Starting);
        assert_eq!(snapshot.percent, 0);
        assert_eq!(snapshot.processed_count, 0);
        assert_eq!(snapshot.total_count, 5);
        assert_eq!(snapshot.current_target, Some(Ipv4Addr::new(192, 168, 1, 10)));

        assert_eq!(agent.submitted().len(), 1);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_agent() {
        let agent = Arc::new(ScriptedAgent::new("job-7", Vec::new()));
        let mut req = request();
        req.agent_ids.clear();

        let err = submitter(&agent).submit(&req).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Validation(ValidationError::NoAgents)));
        assert!(agent.submitted().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_a_submission_error() {
        let agent = Arc::new(
            ScriptedAgent::new("job-7", vec![ScriptStep::json(serde_json::json!({}))])
                .failing_submission("connection refused"),
        );
        let err = submitter(&agent).submit(&request()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Submission(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(agent.status_queries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_submission_times_out() {
        let agent = Arc::new(ScriptedAgent::new("job-7", Vec::new()).stalling_submission());
        let err = submitter(&agent).submit(&request()).await.unwrap_err();
        match err {
            DiscoveryError::Submission(SubmissionError(TransportError::Timeout(after))) => {
                assert_eq!(after, Duration::from_secs(10))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
