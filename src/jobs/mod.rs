//! Network construction jobs: what gets dispatched and who receives it.

pub mod description;
pub mod dispatcher;
pub mod executor;
pub mod kind;
pub mod queue;
pub mod remote;

pub use description::{JobDescription, NetworkSource};
pub use dispatcher::{dispatch, dispatch_timestamp, TIMESTAMP_FORMAT};
pub use executor::{build_executor, ExecutorCall, ExecutorKwargs, JobExecutor, JobHandle, JobStatus};
pub use kind::JobKind;
pub use queue::SqliteJobQueue;
pub use remote::RemoteExecutor;
