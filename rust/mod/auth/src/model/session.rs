use serde::{Deserialize, Serialize};

use super::{User, UserPermission};

/// Session state cached under the session id.
///
/// Stored as JSON: `{"id":1,"username":"...","email":"...","idPermissions":[7]}`.
/// `idPermissions` is `null` when the user has no permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionValue {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(rename = "idPermissions")]
    pub id_permissions: Option<Vec<i64>>,
}

impl SessionValue {
    /// Build session state from a user and their permission rows, keeping
    /// the store's row order. NULL user columns become zero values.
    ///
    /// A grant with a NULL `permission_id` is left out rather than listed
    /// as permission 0, which would name a permission the user was never
    /// given.
    pub fn from_user(user: &User, permissions: &[UserPermission]) -> Self {
        let ids: Vec<i64> = permissions.iter().filter_map(|p| p.permission_id).collect();
        Self {
            id: user.id.unwrap_or_default(),
            username: user.username.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            id_permissions: if ids.is_empty() { None } else { Some(ids) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Some(1),
            username: Some("username".into()),
            email: Some("email@email.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn wire_format() {
        let session = SessionValue::from_user(
            &user(),
            &[UserPermission::new(1, 7), UserPermission::new(1, 3)],
        );
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "username": "username",
                "email": "email@email.com",
                "idPermissions": [7, 3],
            })
        );
    }

    #[test]
    fn no_permissions_is_null() {
        let session = SessionValue::from_user(&user(), &[]);
        let json = serde_json::to_value(&session).unwrap();
        assert!(json["idPermissions"].is_null());
    }

    #[test]
    fn null_permission_ids_are_skipped() {
        let perms = [
            UserPermission { user_id: Some(1), permission_id: None },
            UserPermission::new(1, 9),
        ];
        assert_eq!(SessionValue::from_user(&user(), &perms).id_permissions, Some(vec![9]));
    }

    #[test]
    fn absent_user_fields_become_zero_values() {
        let session = SessionValue::from_user(&User::default(), &[]);
        assert_eq!(session.id, 0);
        assert_eq!(session.username, "");
        assert_eq!(session.email, "");
    }
}
