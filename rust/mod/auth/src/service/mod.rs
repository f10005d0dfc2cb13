pub mod login;
pub mod password;
pub mod schema;
pub mod session;
pub mod validate;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use ecomm_core::error::message;
use ecomm_core::{ErrorMessage, ErrorReporter, Interruption, RequestContext, ServiceError};
use ecomm_kv::KVStore;
use ecomm_sql::SQLStore;

use crate::store::{SessionRepository, StoreError, UserPermissionRepository, UserRepository};
use crate::store_impls::{KvSessionRepository, SqlUserPermissionRepository, SqlUserRepository};

use self::validate::LoginValidator;

/// Message for both unknown email and wrong password.
pub const WRONG_CREDENTIALS: &str = "wrong email or password";

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    FindUser,
    VerifyPassword,
    LoadPermissions,
    EncodeSession,
    PersistSession,
    LoadSession,
    DeleteSession,
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthStage::FindUser => "find user",
            AuthStage::VerifyPassword => "verify password",
            AuthStage::LoadPermissions => "load permissions",
            AuthStage::EncodeSession => "encode session",
            AuthStage::PersistSession => "persist session",
            AuthStage::LoadSession => "load session",
            AuthStage::DeleteSession => "delete session",
        };
        f.write_str(s)
    }
}

/// Auth service error type.
///
/// `UnknownEmail` and `PasswordMismatch` stay distinct here so the
/// observability sink can tell them apart; callers see the same response.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<ErrorMessage>),

    #[error("no user with email {email:?}")]
    UnknownEmail { email: String },

    #[error("password mismatch for user {user_id}")]
    PasswordMismatch { user_id: i64 },

    #[error("{stage} interrupted")]
    Interrupted {
        stage: AuthStage,
        #[source]
        cause: Interruption,
    },

    #[error("{stage} failed: {detail}")]
    Storage { stage: AuthStage, detail: String },

    #[error("no live session")]
    MissingSession,

    #[error("internal: {0}")]
    Internal(String),
}

impl AuthError {
    /// Classify a store failure at `stage`.
    pub fn store(stage: AuthStage, e: StoreError) -> Self {
        match e {
            StoreError::Canceled => AuthError::Interrupted {
                stage,
                cause: Interruption::Canceled,
            },
            StoreError::Timeout => AuthError::Interrupted {
                stage,
                cause: Interruption::DeadlineExceeded,
            },
            StoreError::Storage(detail) => AuthError::Storage { stage, detail },
        }
    }
}

/// Run one store call under the request's cancellation and deadline.
pub(crate) async fn guarded<T, F>(ctx: &RequestContext, stage: AuthStage, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match ctx.run(fut).await {
        Ok(out) => out.map_err(|e| AuthError::store(stage, e)),
        Err(i) => Err(AuthError::store(stage, i.into())),
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(v) => ServiceError::Validation(v),
            AuthError::UnknownEmail { .. } | AuthError::PasswordMismatch { .. } => {
                ServiceError::BadRequest(WRONG_CREDENTIALS.to_string())
            }
            AuthError::Interrupted { .. } => ServiceError::Timeout,
            AuthError::MissingSession => ServiceError::Unauthorized(message::UNAUTHORIZED.to_string()),
            e @ (AuthError::Storage { .. } | AuthError::Internal(_)) => {
                ServiceError::Internal(e.to_string())
            }
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub max_age: Duration,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "sessionId".to_string(),
            domain: None,
            secure: false,
            max_age: Duration::from_secs(86400), // 24h
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Cache ttl for new sessions. Zero stores them with no expiry.
    pub session_ttl: Duration,
    pub cookie: CookieConfig,
    /// Deadline applied to each login/logout request. Zero disables it.
    pub request_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::ZERO,
            cookie: CookieConfig::default(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// The Auth service. Holds the store contracts, the failure sink and
/// configuration.
pub struct AuthService {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) permissions: Arc<dyn UserPermissionRepository>,
    pub(crate) sessions: Arc<dyn SessionRepository>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    pub(crate) validator: LoginValidator,
    pub(crate) config: AuthConfig,
    shutdown: CancellationToken,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        permissions: Arc<dyn UserPermissionRepository>,
        sessions: Arc<dyn SessionRepository>,
        reporter: Arc<dyn ErrorReporter>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            permissions,
            sessions,
            reporter,
            validator: LoginValidator::default(),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the service over the embedded stores, initializing the schema.
    pub fn from_stores(
        sql: Arc<dyn SQLStore>,
        kv: Arc<dyn KVStore>,
        reporter: Arc<dyn ErrorReporter>,
        config: AuthConfig,
    ) -> Result<Arc<Self>, AuthError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self::new(
            Arc::new(SqlUserRepository::new(sql.clone())),
            Arc::new(SqlUserPermissionRepository::new(sql)),
            Arc::new(KvSessionRepository::new(kv)),
            reporter,
            config,
        )))
    }

    /// Replace the login field rules.
    pub fn with_validator(mut self, validator: LoginValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Context for one request: its correlation id, the configured deadline,
    /// and cancellation on shutdown.
    pub fn request_context(&self, request_id: &str) -> RequestContext {
        RequestContext::new(request_id)
            .with_timeout(self.config.request_timeout)
            .with_cancel(self.shutdown.clone())
    }

    /// Canceling this token interrupts every request in flight.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Report a failure to the sink once, then hand it back.
    pub(crate) fn reported(&self, request_id: &str, e: AuthError) -> AuthError {
        self.reporter.report(request_id, &e);
        e
    }

    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn unknown_email_and_mismatch_look_the_same() {
        let a: ServiceError = AuthError::UnknownEmail { email: "a@b.co".into() }.into();
        let b: ServiceError = AuthError::PasswordMismatch { user_id: 1 }.into();
        assert_eq!(a, b);
        assert_eq!(a.to_parts(), b.to_parts());
        assert_eq!(a.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn interruptions_are_408_at_every_stage() {
        for stage in [AuthStage::FindUser, AuthStage::LoadPermissions, AuthStage::PersistSession] {
            for cause in [StoreError::Canceled, StoreError::Timeout] {
                let e: ServiceError = AuthError::store(stage, cause).into();
                assert_eq!(e.status_code(), StatusCode::REQUEST_TIMEOUT);
                assert_eq!(e.errors(), vec![ErrorMessage::general(message::TIMEOUT)]);
            }
        }
    }

    #[test]
    fn storage_detail_stays_internal() {
        let e: ServiceError =
            AuthError::store(AuthStage::FindUser, StoreError::Storage("disk on fire".into())).into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.errors(), vec![ErrorMessage::general(message::INTERNAL)]);
        assert!(e.to_string().contains("disk on fire"));
    }

    #[tokio::test]
    async fn shutdown_interrupts_request_contexts() {
        let sql: Arc<dyn SQLStore> = Arc::new(ecomm_sql::SqliteStore::open_in_memory().unwrap());
        let kv: Arc<dyn KVStore> = Arc::new(ecomm_kv::MemoryStore::new());
        let reporter = Arc::new(ecomm_core::RecordingReporter::new());
        let svc = AuthService::from_stores(sql, kv, reporter, AuthConfig::default()).unwrap();

        let ctx = svc.request_context("req-shutdown");
        assert_eq!(ctx.interruption(), None);
        svc.shutdown_token().cancel();
        assert_eq!(ctx.interruption(), Some(Interruption::Canceled));
        assert_eq!(
            svc.request_context("req-late").interruption(),
            Some(Interruption::Canceled)
        );
    }

    #[test]
    fn missing_session_is_401() {
        let e: ServiceError = AuthError::MissingSession.into();
        assert_eq!(e.status_code(), StatusCode::UNAUTHORIZED);
    }
}
