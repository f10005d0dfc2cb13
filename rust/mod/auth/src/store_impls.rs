//! Store contracts backed by the embedded SQL database and the session cache.
//!
//! Both backends are synchronous, so every call runs on the blocking pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ecomm_core::RequestContext;
use ecomm_kv::KVStore;
use ecomm_sql::{SQLStore, Value};

use crate::model::{User, UserPermission};
use crate::store::{SessionRepository, StoreError, UserPermissionRepository, UserRepository};

async fn blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Storage(format!("blocking task failed: {}", e)))?
}

// ── Users ──

pub struct SqlUserRepository {
    sql: Arc<dyn SQLStore>,
}

impl SqlUserRepository {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }

    /// Insert a user, or refresh username and password hash when the email
    /// already exists. Returns the user id.
    pub fn upsert(&self, username: &str, email: &str, password_hash: &str) -> Result<i64, StoreError> {
        self.sql.exec(
            "INSERT INTO users (username, email, password, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO UPDATE SET username = excluded.username, password = excluded.password",
            &[
                Value::from(username),
                Value::from(email),
                Value::from(password_hash),
                Value::Integer(ecomm_core::now_millis()),
            ],
        )?;
        let rows = self
            .sql
            .query("SELECT id FROM users WHERE email = ?1", &[Value::from(email)])?;
        rows.first()
            .and_then(|r| r.get_i64("id"))
            .ok_or_else(|| StoreError::Storage(format!("user {} missing after upsert", email)))
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        tracing::debug!(request_id = %ctx.request_id(), "looking up user by email");
        let sql = self.sql.clone();
        let email = email.to_string();
        blocking(move || {
            let rows = sql.query(
                "SELECT id, username, email, password, created_at FROM users WHERE email = ?1 LIMIT 1",
                &[Value::Text(email)],
            )?;
            Ok(rows.first().map(User::from_row))
        })
        .await
    }
}

// ── Permissions ──

pub struct SqlUserPermissionRepository {
    sql: Arc<dyn SQLStore>,
}

impl SqlUserPermissionRepository {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }

    /// Make sure the permission exists and grant it to the user.
    pub fn grant(&self, user_id: i64, permission_id: i64, name: &str) -> Result<(), StoreError> {
        self.sql.exec(
            "INSERT OR IGNORE INTO permissions (id, name) VALUES (?1, ?2)",
            &[Value::Integer(permission_id), Value::from(name)],
        )?;
        self.sql.exec(
            "INSERT OR IGNORE INTO user_permissions (user_id, permission_id) VALUES (?1, ?2)",
            &[Value::Integer(user_id), Value::Integer(permission_id)],
        )?;
        Ok(())
    }
}

#[async_trait]
impl UserPermissionRepository for SqlUserPermissionRepository {
    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<Vec<UserPermission>, StoreError> {
        tracing::debug!(request_id = %ctx.request_id(), user_id, "loading permissions");
        let sql = self.sql.clone();
        blocking(move || {
            let rows = sql.query(
                "SELECT user_id, permission_id FROM user_permissions WHERE user_id = ?1 ORDER BY id",
                &[Value::Integer(user_id)],
            )?;
            Ok(rows.iter().map(UserPermission::from_row).collect())
        })
        .await
    }
}

// ── Sessions ──

pub struct KvSessionRepository {
    kv: Arc<dyn KVStore>,
}

impl KvSessionRepository {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl SessionRepository for KvSessionRepository {
    async fn set(
        &self,
        ctx: &RequestContext,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        tracing::debug!(request_id = %ctx.request_id(), ttl_secs = ttl.as_secs(), "writing session");
        let kv = self.kv.clone();
        let key = key.to_string();
        let value = value.to_string();
        blocking(move || Ok(kv.set(&key, value.as_bytes(), ttl)?)).await
    }

    async fn get(&self, _ctx: &RequestContext, key: &str) -> Result<Option<String>, StoreError> {
        let kv = self.kv.clone();
        let key = key.to_string();
        blocking(move || match kv.get(&key)? {
            Some(raw) => String::from_utf8(raw)
                .map(Some)
                .map_err(|e| StoreError::Storage(format!("session {} is not utf-8: {}", key, e))),
            None => Ok(None),
        })
        .await
    }

    async fn del(&self, ctx: &RequestContext, key: &str) -> Result<bool, StoreError> {
        tracing::debug!(request_id = %ctx.request_id(), "deleting session");
        let kv = self.kv.clone();
        let key = key.to_string();
        blocking(move || Ok(kv.delete(&key)?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::schema::init_schema;
    use ecomm_kv::{MemoryStore, RedbStore};
    use ecomm_sql::SqliteStore;

    fn sql() -> Arc<dyn SQLStore> {
        let sql = SqliteStore::open_in_memory().unwrap();
        init_schema(&sql).unwrap();
        Arc::new(sql)
    }

    #[tokio::test]
    async fn find_by_email_hit_and_miss() {
        let sql = sql();
        let users = SqlUserRepository::new(sql.clone());
        let id = users.upsert("username", "email@email.com", "$2b$04$hash").unwrap();
        let ctx = RequestContext::new("req-1");

        let user = users.find_by_email(&ctx, "email@email.com").await.unwrap().unwrap();
        assert_eq!(user.id, Some(id));
        assert_eq!(user.username.as_deref(), Some("username"));
        assert_eq!(user.password_hash.as_deref(), Some("$2b$04$hash"));
        assert!(user.created_at.is_some());

        assert_eq!(users.find_by_email(&ctx, "other@email.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_keeps_id_and_refreshes_hash() {
        let users = SqlUserRepository::new(sql());
        let first = users.upsert("admin", "admin@email.com", "old").unwrap();
        let second = users.upsert("admin", "admin@email.com", "new").unwrap();
        assert_eq!(first, second);

        let ctx = RequestContext::new("req-2");
        let user = users.find_by_email(&ctx, "admin@email.com").await.unwrap().unwrap();
        assert_eq!(user.password_hash.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn null_columns_stay_absent() {
        let sql = sql();
        sql.exec(
            "INSERT INTO users (id, username, email, password) VALUES (5, NULL, 'n@email.com', NULL)",
            &[],
        )
        .unwrap();
        let users = SqlUserRepository::new(sql);
        let ctx = RequestContext::new("req-3");
        let user = users.find_by_email(&ctx, "n@email.com").await.unwrap().unwrap();
        assert_eq!(user.id, Some(5));
        assert_eq!(user.username, None);
        assert_eq!(user.password_hash, None);
    }

    #[tokio::test]
    async fn permissions_in_grant_order() {
        let sql = sql();
        let users = SqlUserRepository::new(sql.clone());
        let perms = SqlUserPermissionRepository::new(sql);
        let id = users.upsert("username", "email@email.com", "h").unwrap();
        perms.grant(id, 9, "orders:write").unwrap();
        perms.grant(id, 7, "orders:read").unwrap();
        perms.grant(id, 9, "orders:write").unwrap();

        let ctx = RequestContext::new("req-4");
        let ids: Vec<_> = perms
            .find_by_user_id(&ctx, id)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|p| p.permission_id)
            .collect();
        assert_eq!(ids, vec![9, 7]);
        assert!(perms.find_by_user_id(&ctx, id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_table_is_storage_error() {
        let bare: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let users = SqlUserRepository::new(bare);
        let ctx = RequestContext::new("req-5");
        let err = users.find_by_email(&ctx, "a@b.co").await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[tokio::test]
    async fn session_set_get_del() {
        let sessions = KvSessionRepository::new(Arc::new(MemoryStore::new()));
        let ctx = RequestContext::new("req-6");
        sessions.set(&ctx, "sid", "{\"id\":1}", Duration::ZERO).await.unwrap();
        assert_eq!(sessions.get(&ctx, "sid").await.unwrap().as_deref(), Some("{\"id\":1}"));
        assert!(sessions.del(&ctx, "sid").await.unwrap());
        assert_eq!(sessions.get(&ctx, "sid").await.unwrap(), None);
        assert!(!sessions.del(&ctx, "sid").await.unwrap());
    }

    #[tokio::test]
    async fn redb_sessions_honor_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let kv = RedbStore::open(&dir.path().join("cache.redb")).unwrap();
        let sessions = KvSessionRepository::new(Arc::new(kv));
        let ctx = RequestContext::new("req-7");

        sessions.set(&ctx, "forever", "a", Duration::ZERO).await.unwrap();
        sessions.set(&ctx, "brief", "b", Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(sessions.get(&ctx, "forever").await.unwrap().as_deref(), Some("a"));
        assert_eq!(sessions.get(&ctx, "brief").await.unwrap(), None);
    }
}
