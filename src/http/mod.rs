//! HTTP surface: routing, extractors and error mapping.

pub mod errors;
pub mod extract;
pub mod server;

pub use errors::{ApiErrorDetail, ApiErrorResponse};
pub use extract::{Caller, RequestId, SubmissionInput};
pub use server::{AppState, HttpGateway};
