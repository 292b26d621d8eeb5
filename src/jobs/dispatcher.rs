use chrono::Utc;

use crate::error::Result;
use crate::jobs::description::{JobDescription, NetworkSource};
use crate::jobs::executor::{ExecutorCall, ExecutorKwargs, JobExecutor, JobHandle};
use crate::jobs::kind::JobKind;

/// UTC, microsecond precision, no offset suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Submission timestamp, taken fresh on every dispatch attempt.
pub fn dispatch_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Hand `description` to the task selected by `kind` and return the job handle.
///
/// Does not wait for the job to run.
pub async fn dispatch(
    executor: &dyn JobExecutor,
    description: JobDescription,
    kind: JobKind,
) -> Result<JobHandle> {
    let kwargs = match description.source {
        NetworkSource::Filepath(path) => ExecutorKwargs::Filepath(path.to_string_lossy().into_owned()),
        NetworkSource::Inline(network) => ExecutorKwargs::Network(network),
    };

    let call = ExecutorCall {
        args: (
            description.threshold,
            description.calibration,
            description.directed,
            dispatch_timestamp(),
        ),
        kwargs,
    };

    log::debug!("Dispatching {} at {}", kind.task_name(), call.timestamp());
    executor.submit(kind.task_name(), call).await
}
