//! Bootstrap: startup config checks and the optional admin seed.

use std::sync::Arc;

use tracing::info;

use auth::store_impls::{SqlUserPermissionRepository, SqlUserRepository};
use ecomm_sql::SQLStore;

use crate::config::{AdminConfig, ServerConfig};

/// Refuse to start on a config that cannot work.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    let name = &config.cookie.name;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        anyhow::bail!("Cookie name {:?} is not a valid cookie token.", name);
    }
    if let Some(admin) = &config.admin {
        if admin.email.is_empty() {
            anyhow::bail!("Admin email is empty in configuration.");
        }
        if !admin.password_hash.starts_with('$') {
            anyhow::bail!(
                "Admin password_hash must be a bcrypt or argon2 hash, not a plain password."
            );
        }
    }
    Ok(())
}

/// Create the configured admin, or refresh its username and hash.
pub fn seed_admin(sql: &Arc<dyn SQLStore>, admin: &AdminConfig) -> anyhow::Result<i64> {
    let users = SqlUserRepository::new(Arc::clone(sql));
    let id = users
        .upsert(&admin.username, &admin.email, &admin.password_hash)
        .map_err(|e| anyhow::anyhow!("failed to seed admin {}: {}", admin.email, e))?;

    let permissions = SqlUserPermissionRepository::new(Arc::clone(sql));
    for p in &admin.permissions {
        permissions
            .grant(id, p.id, &p.name)
            .map_err(|e| anyhow::anyhow!("failed to grant {} to admin: {}", p.name, e))?;
    }
    info!(user_id = id, permissions = admin.permissions.len(), "Admin account ready");
    Ok(id)
}
