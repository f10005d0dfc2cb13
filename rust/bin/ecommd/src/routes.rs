//! Route registration: module routes plus system endpoints.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Router};

use ecomm_core::error::message;
use ecomm_core::{request_id_middleware, RequestId, ServiceError};

/// Build the complete router with all routes.
pub fn build_router(module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    // Module routes carry their full paths and have their state applied.
    for (name, router) in module_routes {
        tracing::debug!(module = name, "mounting module routes");
        app = app.merge(router);
    }

    app.fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(request_id_middleware))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "ecommd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found(request_id: RequestId) -> ServiceError {
    tracing::debug!(request_id = %request_id.as_str(), "no route");
    ServiceError::NotFound(message::NOT_FOUND.to_string())
}

async fn method_not_allowed(request_id: RequestId) -> ServiceError {
    tracing::debug!(request_id = %request_id.as_str(), "method not allowed");
    ServiceError::MethodNotAllowed
}
