//! # Agent RPC Contract
//!
//! The outbound port to a remote scanning agent. The discovery service only
//! depends on this trait; concrete transports live in `sweepr-core::agent`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::discovery::job::JobId;
use crate::discovery::payload::StatusPayload;
use crate::discovery::request::SubmitDiscoveryRequest;
use crate::error::TransportError;

#[async_trait]
pub trait DiscoveryRpc: Send + Sync {
    /// Hands a discovery job to the agent and returns the id it assigned.
    async fn submit_discovery(
        &self,
        request: &SubmitDiscoveryRequest,
    ) -> Result<JobId, TransportError>;

    /// Fetches the current status document of a job.
    async fn get_discovery_status(&self, job_id: &JobId) -> Result<StatusPayload, TransportError>;
}

#[async_trait]
impl<T: DiscoveryRpc + ?Sized> DiscoveryRpc for Arc<T> {
    async fn submit_discovery(
        &self,
        request: &SubmitDiscoveryRequest,
    ) -> Result<JobId, TransportError> {
        (**self).submit_discovery(request).await
    }

    async fn get_discovery_status(&self, job_id: &JobId) -> Result<StatusPayload, TransportError> {
        (**self).get_discovery_status(job_id).await
    }
}
