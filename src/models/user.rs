use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full user row, including the stored credential hash. Never serialized:
/// everything that leaves the server goes through [`UserView`].
#[derive(Debug, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Always a bcrypt hash, never the original secret.
    pub password: String,
}

/// Public projection of a user record. Omitting the hash here, by
/// construction, is what keeps it out of every response body.
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// Registration/update payload. All fields optional so the presence
/// validators produce the per-field messages in declared order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_view_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "johndoe@example.com".into(),
            password: "$2b$10$hash".into(),
        };

        let view = UserView::from(user);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["firstName"], "John");
        assert_eq!(json["lastName"], "Doe");
        assert_eq!(json["email"], "johndoe@example.com");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_user_payload_accepts_partial_bodies() {
        let payload: UserPayload =
            serde_json::from_str(r#"{"firstName": "John", "email": "johndoe@example.com"}"#)
                .unwrap();

        assert_eq!(payload.first_name.as_deref(), Some("John"));
        assert!(payload.last_name.is_none());
        assert!(payload.password.is_none());
    }
}
