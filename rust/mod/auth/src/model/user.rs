use ecomm_sql::Row;
use serde::{Deserialize, Serialize};

/// A row of the `users` table. Every column is nullable, so every field is
/// an `Option`: `None` is a NULL column, `Some("")` is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Unix milliseconds.
    pub created_at: Option<i64>,
}

impl User {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get_i64("id"),
            username: row.get_str("username").map(str::to_string),
            email: row.get_str("email").map(str::to_string),
            password_hash: row.get_str("password").map(str::to_string),
            created_at: row.get_i64("created_at"),
        }
    }
}
