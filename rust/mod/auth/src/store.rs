//! Store access contracts used by the login flow.
//!
//! The orchestrator only talks to these traits. `store_impls` backs them with
//! SQLite and the session cache; tests back them with in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use ecomm_core::{Interruption, RequestContext};
use ecomm_kv::KVError;
use ecomm_sql::SQLError;

use crate::model::{User, UserPermission};

/// Failure of a single store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store call canceled")]
    Canceled,

    #[error("store call timed out")]
    Timeout,

    #[error("storage: {0}")]
    Storage(String),
}

impl From<Interruption> for StoreError {
    fn from(i: Interruption) -> Self {
        match i {
            Interruption::Canceled => StoreError::Canceled,
            Interruption::DeadlineExceeded => StoreError::Timeout,
        }
    }
}

impl From<SQLError> for StoreError {
    fn from(e: SQLError) -> Self {
        match e {
            SQLError::Busy(_) => StoreError::Timeout,
            other => StoreError::Storage(other.to_string()),
        }
    }
}

impl From<KVError> for StoreError {
    fn from(e: KVError) -> Self {
        match e {
            KVError::Busy(_) => StoreError::Timeout,
            other => StoreError::Storage(other.to_string()),
        }
    }
}

/// Credential lookup.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact email match. `Ok(None)` when no user has this email.
    async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, StoreError>;
}

/// Permission lookup. An empty list is a normal outcome.
#[async_trait]
pub trait UserPermissionRepository: Send + Sync {
    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<UserPermission>, StoreError>;
}

/// Session cache. A zero `ttl` stores the entry with no expiry.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn set(
        &self,
        ctx: &RequestContext,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    async fn get(&self, ctx: &RequestContext, key: &str) -> Result<Option<String>, StoreError>;

    /// Returns true if a live entry was removed.
    async fn del(&self, ctx: &RequestContext, key: &str) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_backends_read_as_timeouts() {
        assert_eq!(StoreError::from(SQLError::Busy("locked".into())), StoreError::Timeout);
        assert_eq!(StoreError::from(KVError::Busy("open".into())), StoreError::Timeout);
        assert_eq!(
            StoreError::from(SQLError::Query("no such table".into())),
            StoreError::Storage("query error: no such table".into())
        );
    }

    #[test]
    fn interruptions_keep_their_kind() {
        assert_eq!(StoreError::from(Interruption::Canceled), StoreError::Canceled);
        assert_eq!(StoreError::from(Interruption::DeadlineExceeded), StoreError::Timeout);
    }
}
