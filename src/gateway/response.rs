use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// `Operation-Location`, telling the client where to poll.
pub const OPERATION_LOCATION_HEADER: HeaderName = HeaderName::from_static("operation-location");

/// Prefix of every polling location.
pub const OPERATIONS_PREFIX: &str = "/v1.0/operations/";

/// "Accepted, poll here" reply for a dispatched job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedResponse {
    job_id: String,
    operation_location: String,
}

impl AcceptedResponse {
    pub fn status(&self) -> StatusCode {
        StatusCode::ACCEPTED
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation_location(&self) -> &str {
        &self.operation_location
    }
}

/// Build the 202 reply for `job_id`.
pub fn build_accepted(job_id: &str) -> AcceptedResponse {
    AcceptedResponse {
        job_id: job_id.to_string(),
        operation_location: format!("{}{}", OPERATIONS_PREFIX, job_id),
    }
}

impl IntoResponse for AcceptedResponse {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        match HeaderValue::from_str(&self.operation_location) {
            Ok(value) => {
                response.headers_mut().insert(OPERATION_LOCATION_HEADER, value);
            }
            Err(_) => {
                // Executor ids are opaque; one with control characters cannot be sent back.
                log::error!("Job id {:?} is not a valid header value", self.job_id);
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            }
        }
        response
    }
}
