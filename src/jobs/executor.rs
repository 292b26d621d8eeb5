use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ExecutorBackend};
use crate::db::Db;
use crate::error::{GatewayError, Result};
use crate::jobs::queue::SqliteJobQueue;
use crate::jobs::remote::RemoteExecutor;

/// Identifier returned by the executor for a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
}

/// Exactly one keyword argument; the executor dispatches on its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKwargs {
    Filepath(String),
    Network(Value),
}

/// Call shape handed to the executor.
///
/// Serializes as
/// `{"args": [threshold, calibration, directed, timestamp], "kwargs": {"filepath": ...}}`
/// (or `"network"` instead of `"filepath"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorCall {
    pub args: (f64, bool, bool, String),
    pub kwargs: ExecutorKwargs,
}

impl ExecutorCall {
    pub fn timestamp(&self) -> &str {
        &self.args.3
    }
}

/// Progress of a submitted job as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub id: String,
    pub task: String,
    pub status: String,
    pub submitted_at: String,
    pub updated_at: String,
}

/// Asynchronous execution backend for network construction.
///
/// `submit` returns once the job is accepted, not when it completes.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn submit(&self, task: &str, call: ExecutorCall) -> Result<JobHandle>;

    /// `None` when the backend has never seen `id`.
    async fn status(&self, id: &str) -> Result<Option<JobStatus>>;
}

/// Build the backend selected in `[executor]`.
pub fn build_executor(config: &Config, db: Db) -> Result<Arc<dyn JobExecutor>> {
    match config.executor.backend {
        ExecutorBackend::Queue => {
            log::info!("Job executor: SQLite queue at {}", db.path().display());
            Ok(Arc::new(SqliteJobQueue::new(db)))
        }
        ExecutorBackend::Remote => {
            let url = config.executor.remote_url.as_deref().ok_or_else(|| {
                GatewayError::Config("executor.remote_url is not set".to_string())
            })?;
            log::info!("Job executor: remote broker at {}", url);
            let timeout = Duration::from_secs(config.executor.timeout_secs);
            Ok(Arc::new(RemoteExecutor::new(url, timeout)?))
        }
    }
}
