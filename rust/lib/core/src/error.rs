use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Fixed messages ──────────────────────────────────────────────────
//
// Callers see only these strings for infrastructure failures. The raw
// error text goes to the observability sink, never into a response body.

pub mod message {
    pub const TIMEOUT: &str = "time out or user cancel the request";
    pub const INTERNAL: &str = "internal server error";
    pub const NOT_FOUND: &str = "not found";
    pub const METHOD_NOT_ALLOWED: &str = "method not allowed";
    pub const UNAUTHORIZED: &str = "unauthorized";
}

/// Field name used for errors that are not tied to an input field.
pub const GENERAL_FIELD: &str = "message";

// ── Envelope ────────────────────────────────────────────────────────

/// One field-tagged error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub field: String,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// An error entry under the general `message` field.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(GENERAL_FIELD, message)
    }
}

/// Plain success payload: `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub message: String,
}

impl ResponseMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Uniform response body.
///
/// Both keys are always serialized; exactly one of them is non-null:
///
/// ```json
/// {"data": {"message": "successfully login"}, "errors": null}
/// {"data": null, "errors": [{"field": "message", "message": "not found"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<ErrorMessage>>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    pub fn err(errors: Vec<ErrorMessage>) -> Self {
        Self {
            data: None,
            errors: Some(errors),
        }
    }
}

// ── ServiceError ────────────────────────────────────────────────────

/// HTTP-facing error. Each variant maps to one status code and one
/// envelope shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Field-level input violations, order preserved. HTTP 400.
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<ErrorMessage>),

    /// Request rejected with a caller-safe message. HTTP 400.
    #[error("{0}")]
    BadRequest(String),

    /// Missing session or credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// No such route or resource. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Route exists but not for this method. HTTP 405.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Request canceled or its deadline passed. HTTP 408.
    #[error("request canceled or timed out")]
    Timeout,

    /// Any infrastructure failure. HTTP 500. The detail is for logs only.
    #[error("{0}")]
    Internal(String),
}

fn join_violations(v: &[ErrorMessage]) -> String {
    v.iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-visible error entries. Internal detail never appears here.
    pub fn errors(&self) -> Vec<ErrorMessage> {
        match self {
            ServiceError::Validation(v) => v.clone(),
            ServiceError::BadRequest(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::NotFound(m) => vec![ErrorMessage::general(m.clone())],
            ServiceError::MethodNotAllowed => {
                vec![ErrorMessage::general(message::METHOD_NOT_ALLOWED)]
            }
            ServiceError::Timeout => vec![ErrorMessage::general(message::TIMEOUT)],
            ServiceError::Internal(_) => vec![ErrorMessage::general(message::INTERNAL)],
        }
    }

    /// Status and envelope, as sent to the caller.
    pub fn to_parts(&self) -> (StatusCode, Envelope<ResponseMessage>) {
        (self.status_code(), Envelope::err(self.errors()))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts();
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ServiceError::Timeout.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            ServiceError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ServiceError::Internal("connection refused on 10.0.0.3:5432".into());
        let (_, body) = err.to_parts();
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("10.0.0.3"));
        assert_eq!(
            json,
            r#"{"data":null,"errors":[{"field":"message","message":"internal server error"}]}"#
        );
        // The detail is still available for logging.
        assert_eq!(err.to_string(), "connection refused on 10.0.0.3:5432");
    }

    #[test]
    fn timeout_envelope() {
        let (status, body) = ServiceError::Timeout.to_parts();
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body.errors,
            Some(vec![ErrorMessage::general("time out or user cancel the request")])
        );
        assert!(body.data.is_none());
    }

    #[test]
    fn validation_keeps_order() {
        let err = ServiceError::Validation(vec![
            ErrorMessage::new("email", "is required"),
            ErrorMessage::new("password", "is required"),
        ]);
        let errors = err.errors();
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[1].field, "password");
        assert_eq!(err.to_string(), "validation failed: email is required, password is required");
    }

    #[test]
    fn success_envelope_serializes_null_errors() {
        let body = Envelope::ok(ResponseMessage::new("successfully login"));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"data": {"message": "successfully login"}, "errors": null})
        );
    }

    #[test]
    fn json_response_status() {
        let resp = ServiceError::NotFound(message::NOT_FOUND.into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
