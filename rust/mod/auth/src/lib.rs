//! Auth module: email/password login backed by an opaque cached session.
//!
//! # Flow
//!
//! - **Validate** the submission against per-field rules
//! - **Find** the user by email and **verify** the password hash
//! - **Load** the user's permission ids
//! - **Mint** a session id and **persist** the session state in the cache
//!
//! Every failure is reported to the configured `ErrorReporter` with the
//! request's correlation id and mapped to a 400, 408 or 500 envelope.
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, kv, Arc::new(TracingReporter), AuthConfig::default())?;
//! let router = module.routes(); // /api/v1/users/...
//! ```

pub mod api;
pub mod model;
pub mod service;
pub mod store;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;

use ecomm_core::{ErrorReporter, Module};

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create a new AuthModule over the embedded stores.
    pub fn new(
        sql: Arc<dyn ecomm_sql::SQLStore>,
        kv: Arc<dyn ecomm_kv::KVStore>,
        reporter: Arc<dyn ErrorReporter>,
        config: AuthConfig,
    ) -> Result<Self, ecomm_core::ServiceError> {
        let service = AuthService::from_stores(sql, kv, reporter, config)
            .map_err(ecomm_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
