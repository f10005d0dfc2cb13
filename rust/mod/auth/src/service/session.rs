use ecomm_core::RequestContext;

use crate::model::SessionValue;
use crate::service::{guarded, AuthError, AuthService, AuthStage};

/// A new session id: a hyphenated UUIDv4.
pub fn mint_session_id() -> String {
    ecomm_core::new_id()
}

/// Serialize session state into the cached JSON form.
pub fn encode_session(session: &SessionValue) -> Result<String, AuthError> {
    serde_json::to_string(session).map_err(|e| AuthError::Storage {
        stage: AuthStage::EncodeSession,
        detail: e.to_string(),
    })
}

impl AuthService {
    /// Look up cached session state. Returns `None` for unknown or expired ids.
    pub async fn get_session(
        &self,
        ctx: &RequestContext,
        session_id: &str,
    ) -> Result<Option<SessionValue>, AuthError> {
        self.load_session(ctx, session_id)
            .await
            .map_err(|e| self.reported(ctx.request_id(), e))
    }

    /// The session named by the caller's cookie. A missing cookie and an
    /// unknown or expired session are both `MissingSession`.
    pub async fn current_session(
        &self,
        ctx: &RequestContext,
        session_id: Option<&str>,
    ) -> Result<SessionValue, AuthError> {
        let Some(session_id) = session_id.filter(|s| !s.is_empty()) else {
            return Err(self.reported(ctx.request_id(), AuthError::MissingSession));
        };
        self.get_session(ctx, session_id)
            .await?
            .ok_or_else(|| self.reported(ctx.request_id(), AuthError::MissingSession))
    }

    async fn load_session(
        &self,
        ctx: &RequestContext,
        session_id: &str,
    ) -> Result<Option<SessionValue>, AuthError> {
        let raw = guarded(ctx, AuthStage::LoadSession, self.sessions.get(ctx, session_id)).await?;
        raw.map(|s| {
            serde_json::from_str(&s).map_err(|e| AuthError::Storage {
                stage: AuthStage::LoadSession,
                detail: format!("undecodable session: {}", e),
            })
        })
        .transpose()
    }

    /// Delete a session. Deleting an unknown id is not an error.
    pub async fn logout(
        &self,
        ctx: &RequestContext,
        session_id: Option<&str>,
    ) -> Result<bool, AuthError> {
        let Some(session_id) = session_id.filter(|s| !s.is_empty()) else {
            return Err(self.reported(ctx.request_id(), AuthError::MissingSession));
        };

        let removed = guarded(ctx, AuthStage::DeleteSession, self.sessions.del(ctx, session_id))
            .await
            .map_err(|e| self.reported(ctx.request_id(), e))?;

        tracing::info!(request_id = %ctx.request_id(), removed, "logout");
        Ok(removed)
    }
}
