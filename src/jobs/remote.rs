use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::error::{GatewayError, Result};
use crate::jobs::executor::{ExecutorCall, JobExecutor, JobHandle, JobStatus};

/// Reply to a task submission
#[derive(Deserialize)]
struct SubmitReply {
    id: String,
}

/// Executor backend that forwards jobs to a task broker over HTTP.
///
/// * `POST {base}/tasks/{task}` with the JSON [`ExecutorCall`], answered by `{"id": "..."}`
/// * `GET {base}/tasks/{id}` answered by a [`JobStatus`], or 404
///
/// Requests are made once; failures are reported, never retried.
pub struct RemoteExecutor {
    client: Client,
    base: Url,
}

impl RemoteExecutor {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| GatewayError::Config(format!("Invalid executor URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    /// `{base}/tasks/{segment}`, with `segment` percent-encoded as a single
    /// path component so it cannot climb out of `tasks/`.
    fn endpoint(&self, segment: &str) -> Result<Url> {
        if !is_plain_segment(segment) {
            return Err(GatewayError::Executor(format!(
                "Invalid task path segment: {:?}",
                segment
            )));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Config(format!("Executor URL cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .push("tasks")
            .push(segment);
        Ok(url)
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
}

#[async_trait]
impl JobExecutor for RemoteExecutor {
    async fn submit(&self, task: &str, call: ExecutorCall) -> Result<JobHandle> {
        let url = self.endpoint(task)?;

        let response = self
            .client
            .post(url)
            .json(&call)
            .send()
            .await
            .map_err(|e| GatewayError::Executor(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(GatewayError::Executor(format!(
                "Broker rejected {} with {}: {}",
                task, status, body
            )));
        }

        let reply: SubmitReply = response
            .json()
            .await
            .map_err(|e| GatewayError::Executor(format!("Failed to parse response: {}", e)))?;

        if reply.id.trim().is_empty() {
            return Err(GatewayError::Executor("Broker returned an empty job id".to_string()));
        }

        Ok(JobHandle { id: reply.id })
    }

    async fn status(&self, id: &str) -> Result<Option<JobStatus>> {
        // Nothing the broker issued looks like this.
        if !is_plain_segment(id) {
            return Ok(None);
        }
        let url = self.endpoint(id)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Executor(format!("Network error: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| GatewayError::Executor(format!("Failed to parse status: {}", e))),
            status => Err(GatewayError::Executor(format!(
                "Broker status lookup for {} failed with {}",
                id, status
            ))),
        }
    }
}
