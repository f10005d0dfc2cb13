use ecomm_sql::Row;
use serde::{Deserialize, Serialize};

/// A row of the `user_permissions` join table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermission {
    pub user_id: Option<i64>,
    pub permission_id: Option<i64>,
}

impl UserPermission {
    pub fn new(user_id: i64, permission_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            permission_id: Some(permission_id),
        }
    }

    pub fn from_row(row: &Row) -> Self {
        Self {
            user_id: row.get_i64("user_id"),
            permission_id: row.get_i64("permission_id"),
        }
    }
}
