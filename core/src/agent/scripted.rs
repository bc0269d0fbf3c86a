//! An agent that answers from a script instead of the network.
//!
//! Each status query consumes the next [`ScriptStep`]. Once the script runs
//! out, queries fail, which ends a job that never reached a terminal status.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use sweepr_common::discovery::job::JobId;
use sweepr_common::discovery::payload::StatusPayload;
use sweepr_common::discovery::request::SubmitDiscoveryRequest;
use sweepr_common::error::TransportError;
use sweepr_common::rpc::DiscoveryRpc;

#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Answer with this payload.
    Payload(StatusPayload),
    /// Fail the query with a transport error.
    Fail(String),
    /// Never answer. Only a timeout or cancellation gets past this.
    Stall,
}

impl ScriptStep {
    pub fn json(value: Value) -> Self {
        Self::Payload(StatusPayload::from_value(value))
    }
}

#[derive(Debug, Clone)]
enum Submission {
    Accept,
    Fail(String),
    Stall,
}

pub struct ScriptedAgent {
    job_id: JobId,
    submission: Submission,
    steps: Mutex<VecDeque<ScriptStep>>,
    submitted: Mutex<Vec<SubmitDiscoveryRequest>>,
    queries: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(job_id: impl Into<String>, steps: Vec<ScriptStep>) -> Self {
        Self {
            job_id: JobId::new(job_id),
            submission: Submission::Accept,
            steps: Mutex::new(steps.into()),
            submitted: Mutex::new(Vec::new()),
            queries: AtomicUsize::new(0),
        }
    }

    /// One payload per status query, in order.
    pub fn from_payloads(job_id: impl Into<String>, payloads: Vec<Value>) -> Self {
        Self::new(job_id, payloads.into_iter().map(ScriptStep::json).collect())
    }

    pub fn failing_submission(mut self, reason: impl Into<String>) -> Self {
        self.submission = Submission::Fail(reason.into());
        self
    }

    pub fn stalling_submission(mut self) -> Self {
        self.submission = Submission::Stall;
        self
    }

    /// Requests received so far.
    pub fn submitted(&self) -> Vec<SubmitDiscoveryRequest> {
        lock(&self.submitted).clone()
    }

    /// Status queries received so far.
    pub fn status_queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn remaining_steps(&self) -> usize {
        lock(&self.steps).len()
    }
}

/// A poisoned lock only means another test thread panicked mid-update.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DiscoveryRpc for ScriptedAgent {
    async fn submit_discovery(
        &self,
        request: &SubmitDiscoveryRequest,
    ) -> Result<JobId, TransportError> {
        match &self.submission {
            Submission::Accept => {
                lock(&self.submitted).push(request.clone());
                Ok(self.job_id.clone())
            }
            Submission::Fail(reason) => Err(TransportError::Script(reason.clone())),
            Submission::Stall => std::future::pending().await,
        }
    }

    async fn get_discovery_status(&self, job_id: &JobId) -> Result<StatusPayload, TransportError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if *job_id != self.job_id {
            return Err(TransportError::Status {
                status: 404,
                body: format!("unknown job {job_id}"),
            });
        }

        let step = lock(&self.steps).pop_front();
        match step {
            Some(ScriptStep::Payload(payload)) => Ok(payload),
            Some(ScriptStep::Fail(reason)) => Err(TransportError::Script(reason)),
            Some(ScriptStep::Stall) => std::future::pending().await,
            None => Err(TransportError::Script("status script exhausted".to_string())),
        }
    }
}
