//! REST client for a remote scanning agent.
//!
//! `POST {base}/discovery/start` submits a job and `GET
//! {base}/discovery/status/{job_id}` returns its status document.

use async_trait::async_trait;
use serde::de::Error as _;
use serde_json::Value;

use sweepr_common::debug;
use sweepr_common::discovery::job::JobId;
use sweepr_common::discovery::payload::StatusPayload;
use sweepr_common::discovery::request::SubmitDiscoveryRequest;
use sweepr_common::error::TransportError;
use sweepr_common::rpc::DiscoveryRpc;

/// HTTP client for a single agent endpoint.
pub struct HttpAgent {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAgent {
    /// * `base_url` - e.g. `http://scanner.local:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuses an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Returns the response unchanged on success, or a
    /// [`TransportError::Status`] with the body text otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// `{base}/discovery/status/{job_id}` with the id as one encoded segment.
    fn status_url(&self, job_id: &JobId) -> Result<reqwest::Url, TransportError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|err| TransportError::Request(Box::new(err)))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::Request(format!("{} cannot carry a path", self.base_url).into()))?
            .pop_if_empty()
            .extend(["discovery", "status", job_id.as_str()]);
        Ok(url)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
        let response = Self::ensure_success(response).await?;
        response.json::<Value>().await.map_err(request_error)
    }
}

fn request_error(err: reqwest::Error) -> TransportError {
    TransportError::Request(Box::new(err))
}

/// Agents disagree on the name and type of the id field.
fn job_id_from(body: &Value) -> Option<JobId> {
    ["job_id", "id", "jobId"]
        .iter()
        .filter_map(|key| body.get(key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(JobId::new(s.trim())),
            Value::Number(n) => Some(JobId::new(n.to_string())),
            _ => None,
        })
}

#[async_trait]
impl DiscoveryRpc for HttpAgent {
    async fn submit_discovery(
        &self,
        request: &SubmitDiscoveryRequest,
    ) -> Result<JobId, TransportError> {
        let url = format!("{}/discovery/start", self.base_url);
        debug!(url = %url, "Submitting discovery job");

        let response = self
            .authorize(self.client.post(&url).json(request))
            .send()
            .await
            .map_err(request_error)?;

        let body = Self::read_json(response).await?;
        job_id_from(&body).ok_or_else(|| {
            TransportError::Decode(serde_json::Error::custom("response carries no job id"))
        })
    }

    async fn get_discovery_status(&self, job_id: &JobId) -> Result<StatusPayload, TransportError> {
        let url = self.status_url(job_id)?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(request_error)?;

        let body = Self::read_json(response).await?;
        Ok(StatusPayload::from_value(body))
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
