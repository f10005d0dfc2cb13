pub mod cookie;
mod users;

use std::sync::Arc;

use axum::Router;

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the user session router. Routes carry their full paths.
pub fn build_router(svc: Arc<AuthService>) -> Router {
    Router::new().merge(users::routes()).with_state(svc)
}
