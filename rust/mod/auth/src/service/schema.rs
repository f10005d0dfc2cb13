use ecomm_sql::SQLStore;

use crate::service::AuthError;

/// Initialize the SQLite schema for users and their permissions.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AuthError> {
    let statements = [
        // Users: credentials. Columns are nullable to match legacy rows.
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT,
            email TEXT UNIQUE,
            password TEXT,
            created_at INTEGER
        )",

        // Permissions: named capabilities
        "CREATE TABLE IF NOT EXISTS permissions (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",

        // User permissions: grants, read in insertion order
        "CREATE TABLE IF NOT EXISTS user_permissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
            permission_id INTEGER REFERENCES permissions(id) ON DELETE CASCADE,
            UNIQUE (user_id, permission_id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_user_permissions_user ON user_permissions(user_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| AuthError::Internal(format!("schema init: {}", e)))?;
    }

    tracing::debug!("auth schema initialized");
    Ok(())
}
