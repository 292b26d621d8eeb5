//! Request intake: the two accepted input shapes and their resolution into a
//! single [`JobDescription`](crate::jobs::JobDescription).

pub mod fields;
pub mod form;
pub mod resolver;
pub mod upload;

pub use fields::extract_bool;
pub use form::{FieldValue, InlinePayload, RequestInput, SubmittedForm};
pub use resolver::{resolve, DEFAULT_THRESHOLD};
pub use upload::{persist_upload, sanitize_filename, DEFAULT_UPLOAD_FIELD};
