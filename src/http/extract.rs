//! Request extractors: the caller, the request id and the input shape.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::convert::Infallible;
use uuid::Uuid;

use crate::caller::{CallerContext, ANONYMOUS_CALLER};
use crate::error::{GatewayError, Result};
use crate::http::errors::{ApiErrorDetail, ApiErrorResponse};
use crate::http::server::AppState;
use crate::intake::{FieldValue, InlinePayload, RequestInput, SubmittedForm};

/// Header naming the caller on whose behalf the request is made.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying a client-chosen request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The authenticated caller.
pub struct Caller(pub CallerContext);

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        if !state.authless {
            validate_auth(&parts.headers, &state.api_key)?;
        }
        validate_origin(&parts.headers, &state.allowed_origins)?;

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(ANONYMOUS_CALLER);

        Ok(Caller(CallerContext::new(user_id, &state.storage_root)))
    }
}

/// `X-Request-Id` when supplied, otherwise a fresh UUID.
pub struct RequestId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|id| !id.trim().is_empty())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Ok(RequestId(id))
    }
}

/// Which of the two input shapes the request used.
///
/// `multipart/form-data` becomes a form; any other body is decoded as a JSON
/// object. An empty body is an empty payload, which resolution rejects.
pub struct SubmissionInput(pub RequestInput);

#[axum::async_trait]
impl<S> FromRequest<S> for SubmissionInput
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase());

        if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
        {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| GatewayError::validation("form", e.to_string()))?;
            return Ok(Self(RequestInput::Form(read_form(multipart).await?)));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| GatewayError::validation("request body", e.to_string()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(RequestInput::Payload(InlinePayload::default())));
        }

        let is_json = content_type
            .as_deref()
            .map_or(true, |ct| ct.starts_with("application/json") || ct.contains("+json"));
        if !is_json {
            return Err(GatewayError::validation(
                "request body",
                format!(
                    "Unsupported content type: {}",
                    content_type.as_deref().unwrap_or_default()
                ),
            ));
        }

        let payload: InlinePayload = serde_json::from_slice(&body).map_err(|e| {
            GatewayError::validation("request body", format!("Invalid request body: {}", e))
        })?;
        Ok(Self(RequestInput::Payload(payload)))
    }
}

async fn read_form(mut multipart: Multipart) -> Result<SubmittedForm> {
    let mut form = SubmittedForm::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::validation("form", format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(String::from) {
            Some(filename) => {
                let bytes = field.bytes().await.map_err(|e| {
                    GatewayError::validation(name.clone(), format!("Read error: {}", e))
                })?;
                form.insert(name, FieldValue::file(filename, bytes.to_vec()));
            }
            None => {
                let text = field.text().await.map_err(|e| {
                    GatewayError::validation(name.clone(), format!("Read error: {}", e))
                })?;
                form.insert(name, FieldValue::text(text));
            }
        }
    }

    Ok(form)
}

/// Rejection in the same `{"error": {code, message, target}}` shape as
/// [`GatewayError`] responses.
fn reject(status: StatusCode, code: &str, message: String, target: &str) -> Response {
    let body = ApiErrorResponse {
        error: ApiErrorDetail {
            code: code.to_string(),
            message,
            target: target.to_string(),
        },
    };
    (status, Json(body)).into_response()
}

/// Validate Authorization header
fn validate_auth(headers: &HeaderMap, expected_key: &str) -> std::result::Result<(), Response> {
    let unauthorized = |message: &str| {
        reject(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            message.to_string(),
            "authorization",
        )
    };

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            unauthorized("Missing Authorization header. Use 'Authorization: Bearer <api-key>'")
        })?;

    let Some(provided_key) = auth_header.strip_prefix("Bearer ") else {
        return Err(unauthorized(
            "Invalid Authorization header format. Use 'Authorization: Bearer <api-key>'",
        ));
    };

    if provided_key != expected_key {
        return Err(unauthorized("Invalid API key"));
    }

    Ok(())
}

/// Validate Origin header (prevents DNS rebinding attacks)
fn validate_origin(headers: &HeaderMap, allowed_origins: &[String]) -> std::result::Result<(), Response> {
    if allowed_origins.is_empty() {
        return Ok(());
    }

    // No Origin header: direct request, not a browser
    let Some(origin) = headers.get(header::ORIGIN).and_then(|h| h.to_str().ok()) else {
        return Ok(());
    };

    if allowed_origins.iter().any(|allowed| origin == allowed) {
        Ok(())
    } else {
        Err(reject(
            StatusCode::FORBIDDEN,
            "OriginNotAllowed",
            format!("Origin '{}' is not in the allowed origins list", origin),
            "origin",
        ))
    }
}
