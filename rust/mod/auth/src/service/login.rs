//! Email/password login.
//!
//! Stages run strictly in order: validate, find user, verify password, load
//! permissions, mint and persist the session. The first failure ends the
//! request; it is reported to the failure sink once and returned.

use std::sync::Arc;

use ecomm_core::RequestContext;
use tokio::task::JoinHandle;

use crate::model::{LoginRequest, SessionValue, User};
use crate::service::password::verify_password;
use crate::service::session::{encode_session, mint_session_id};
use crate::service::{guarded, AuthError, AuthService, AuthStage};
use crate::store::StoreError;

/// A persisted session. Only produced after the cache write succeeded.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session_id: String,
    pub session: SessionValue,
}

impl AuthService {
    pub async fn login(
        &self,
        ctx: &RequestContext,
        req: &LoginRequest,
    ) -> Result<LoginOutcome, AuthError> {
        match self.try_login(ctx, req).await {
            Ok(outcome) => {
                tracing::info!(
                    request_id = %ctx.request_id(),
                    user_id = outcome.session.id,
                    permissions = outcome.session.id_permissions.as_ref().map_or(0, Vec::len),
                    "login succeeded"
                );
                Ok(outcome)
            }
            Err(e) => Err(self.reported(ctx.request_id(), e)),
        }
    }

    async fn try_login(
        &self,
        ctx: &RequestContext,
        req: &LoginRequest,
    ) -> Result<LoginOutcome, AuthError> {
        let violations = self.validator.validate(req);
        if !violations.is_empty() {
            return Err(AuthError::Validation(violations));
        }

        let user = guarded(ctx, AuthStage::FindUser, self.users.find_by_email(ctx, &req.email))
            .await?
            .ok_or_else(|| AuthError::UnknownEmail {
                email: req.email.clone(),
            })?;

        self.check_password(ctx, &user, &req.password).await?;

        let user_id = user.id.unwrap_or_default();
        let permissions = guarded(
            ctx,
            AuthStage::LoadPermissions,
            self.permissions.find_by_user_id(ctx, user_id),
        )
        .await?;

        let session = SessionValue::from_user(&user, &permissions);
        let session_id = mint_session_id();
        let encoded = encode_session(&session)?;

        self.persist_session(ctx, &session_id, encoded).await?;

        Ok(LoginOutcome {
            session_id,
            session,
        })
    }

    /// Write the session on its own task so an interrupted caller can still
    /// see it through. A write that lands after the caller gave up is
    /// deleted again, since nobody holds its id.
    async fn persist_session(
        &self,
        ctx: &RequestContext,
        session_id: &str,
        encoded: String,
    ) -> Result<(), AuthError> {
        if let Some(cause) = ctx.interruption() {
            return Err(AuthError::Interrupted {
                stage: AuthStage::PersistSession,
                cause,
            });
        }

        let mut write: JoinHandle<Result<(), StoreError>> = {
            let sessions = Arc::clone(&self.sessions);
            let ctx = ctx.clone();
            let key = session_id.to_string();
            let ttl = self.config.session_ttl;
            tokio::spawn(async move { sessions.set(&ctx, &key, &encoded, ttl).await })
        };

        match ctx.run(&mut write).await {
            Ok(joined) => joined
                .map_err(|e| AuthError::Internal(format!("session write task: {}", e)))?
                .map_err(|e| AuthError::store(AuthStage::PersistSession, e)),
            Err(cause) => {
                self.discard_late_session(ctx.request_id(), session_id, write);
                Err(AuthError::Interrupted {
                    stage: AuthStage::PersistSession,
                    cause,
                })
            }
        }
    }

    fn discard_late_session(
        &self,
        request_id: &str,
        session_id: &str,
        write: JoinHandle<Result<(), StoreError>>,
    ) {
        let sessions = Arc::clone(&self.sessions);
        let ctx = RequestContext::new(request_id);
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            if !matches!(write.await, Ok(Ok(()))) {
                return;
            }
            match sessions.del(&ctx, &session_id).await {
                Ok(_) => tracing::debug!(request_id = %ctx.request_id(), "discarded late session write"),
                Err(e) => tracing::warn!(
                    request_id = %ctx.request_id(),
                    error = %e,
                    "failed to discard late session write"
                ),
            }
        });
    }

    /// A user without a stored hash never matches.
    async fn check_password(
        &self,
        ctx: &RequestContext,
        user: &User,
        password: &str,
    ) -> Result<(), AuthError> {
        let user_id = user.id.unwrap_or_default();
        let Some(hash) = user.password_hash.clone() else {
            return Err(AuthError::PasswordMismatch { user_id });
        };

        let password = password.to_string();
        let matched = ctx
            .run(tokio::task::spawn_blocking(move || verify_password(&password, &hash)))
            .await
            .map_err(|cause| AuthError::Interrupted {
                stage: AuthStage::VerifyPassword,
                cause,
            })?
            .map_err(|e| AuthError::Internal(format!("password verification task: {}", e)))?;

        if matched {
            Ok(())
        } else {
            Err(AuthError::PasswordMismatch { user_id })
        }
    }
}
