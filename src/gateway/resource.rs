use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::caller::CallerContext;
use crate::error::{GatewayError, Result};
use crate::gateway::events::EventSink;
use crate::gateway::response::{build_accepted, AcceptedResponse};
use crate::intake::{resolve, RequestInput};
use crate::jobs::{dispatch, JobExecutor, JobKind, JobStatus};

/// Progress of one submission. A failure at any stage rejects it; earlier
/// side effects (a persisted upload) are left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Resolved,
    Dispatched,
    Accepted,
}

/// Sequences resolution, dispatch and the accepted reply for both job kinds.
pub struct Gateway {
    executor: Arc<dyn JobExecutor>,
    events: Arc<dyn EventSink>,
}

impl Gateway {
    pub fn new(executor: Arc<dyn JobExecutor>, events: Arc<dyn EventSink>) -> Self {
        Self { executor, events }
    }

    /// Submit a network construction job of kind `kind`.
    ///
    /// The kind is checked before anything is read from `input`.
    pub async fn submit(
        &self,
        kind: &str,
        input: RequestInput,
        caller: &CallerContext,
        request_id: &str,
    ) -> Result<AcceptedResponse> {
        let mut stage = Stage::Received;
        let result = self.run(kind, input, caller, request_id, &mut stage).await;

        if let Err(e) = &result {
            log::warn!(
                "[{}] Submission rejected after {:?}: {} ({})",
                request_id,
                stage,
                e,
                e.name()
            );
        }
        result
    }

    async fn run(
        &self,
        kind: &str,
        input: RequestInput,
        caller: &CallerContext,
        request_id: &str,
        stage: &mut Stage,
    ) -> Result<AcceptedResponse> {
        let kind: JobKind = kind.parse()?;
        log::debug!("[{}] {:?} {} job for {}", request_id, stage, kind, caller.user_id());

        let description = resolve(input, caller).await?;
        let filepath = description.filepath().map(|p| p.to_string_lossy().into_owned());
        *stage = Stage::Resolved;
        log::debug!("[{}] {:?}", request_id, stage);

        let handle = dispatch(self.executor.as_ref(), description, kind).await?;
        *stage = Stage::Dispatched;
        log::debug!("[{}] {:?} as job {}", request_id, stage, handle.id);

        let accepted = build_accepted(&handle.id);
        *stage = Stage::Accepted;

        let mut fields = Map::new();
        fields.insert("job_id".to_string(), json!(handle.id));
        fields.insert("job_kind".to_string(), json!(kind.as_str()));
        if let Some(filepath) = filepath {
            fields.insert("filepath".to_string(), Value::String(filepath));
        }
        self.events
            .log_event(request_id, "network construction job dispatched", fields);

        Ok(accepted)
    }

    /// Current status of a dispatched job, for the polling endpoint.
    pub async fn operation(&self, id: &str) -> Result<JobStatus> {
        self.executor
            .status(id)
            .await?
            .ok_or_else(|| GatewayError::resource("url", format!("no such operation: {}", id)))
    }
}
