use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::{UserError, UserResult};

/// A user account as stored in the `users` collection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Unique across all users (unique index on `email`)
    pub email: String,
    /// Argon2 PHC string, never the plaintext
    pub password: String,
    #[serde(default)]
    pub active: bool,
}

impl User {
    /// Fresh, inactive user with a newly assigned id.
    pub fn new(input: NewUser) -> Self {
        Self {
            id: ObjectId::new(),
            email: input.email,
            password: input.password_hash,
            active: false,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("active", &self.active)
            .finish()
    }
}

/// What the store needs to insert a user. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Public view of a [`User`]; the password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// 24-character hex ObjectId
    #[schema(example = "65f1c0ffee0123456789abcd")]
    pub id: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            email: user.email,
            active: user.active,
        }
    }
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// Partial update; absent or empty fields are left unchanged.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct ActivateAccount {
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub password: String,
}

/// Parses the textual id used in URLs.
pub fn parse_user_id(id: &str) -> UserResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| UserError::InvalidId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        }
    }

    #[test]
    fn test_new_user_is_inactive() {
        let user = User::new(new_user("jane@example.com"));
        assert!(!user.active);
        assert_eq!(user.email, "jane@example.com");
    }

    #[test]
    fn test_new_users_get_distinct_ids() {
        let a = User::new(new_user("a@example.com"));
        let b = User::new(new_user("b@example.com"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_response_hides_password() {
        let user = User::new(new_user("jane@example.com"));
        let id = user.id;
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(json["id"], id.to_hex());
        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["active"], false);
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let user = User::new(new_user("jane@example.com"));
        let debug = format!("{:?}", user);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("argon2"));
    }

    #[test]
    fn test_parse_user_id() {
        let id = ObjectId::new();
        assert_eq!(parse_user_id(&id.to_hex()).unwrap(), id);

        for bad in ["", "123", "not-an-object-id-at-all!", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            assert!(matches!(parse_user_id(bad), Err(UserError::InvalidId(_))));
        }
    }

    #[test]
    fn test_user_document_uses_underscore_id() {
        let user = User::new(new_user("jane@example.com"));
        let doc = mongodb::bson::to_document(&user).unwrap();
        assert_eq!(doc.get_object_id("_id").unwrap(), user.id);
        assert!(!doc.contains_key("id"));
    }

    #[test]
    fn test_update_user_fields_are_optional() {
        let update: UpdateUser = serde_json::from_str(r#"{"email":"new@example.com"}"#).unwrap();
        assert_eq!(update.email.as_deref(), Some("new@example.com"));
        assert!(update.password.is_none());
    }
}
