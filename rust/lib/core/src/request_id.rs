//! Request-id middleware.
//!
//! Takes `x-request-id` from the incoming request (or mints one), stores it
//! as a `RequestId` extension, echoes it on the response and logs one line
//! per request.

use std::time::Instant;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::types::new_id;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(new_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate))
    }
}

/// Accept a caller-supplied id only if it is short and printable.
fn incoming_id(req: &Request) -> Option<String> {
    let raw = req.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > 128 || !raw.chars().all(|c| c.is_ascii_graphic()) {
        return None;
    }
    Some(raw.to_string())
}

pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = incoming_id(&req).map(RequestId).unwrap_or_else(RequestId::generate);
    req.extensions_mut().insert(id.clone());

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    tracing::info!(
        request_id = %id.as_str(),
        method = %method,
        path = %path,
        status = resp.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}
