use axum::Router;

/// A service module that contributes HTTP routes.
///
/// The binary collects all modules and merges their routes into the
/// server router. Routes carry their full path (e.g. `/api/v1/users/login`).
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes with state already applied.
    fn routes(&self) -> Router;
}
