use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Stored user document. The password hash is persisted but must never reach
/// a client; handlers respond with [`UserResponse`] or [`UserPublic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password: password_hash,
            profile_pic: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id.clone(),
            username: self.username.clone(),
            profile_pic: self.profile_pic.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            username: self.username.clone(),
            profile_pic: self.profile_pic.clone(),
        }
    }
}

/// Full user shape returned to the account owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author/commenter shape embedded in post and comment responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub username: String,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 30, message = "All fields are required"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    pub profile_pic: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_never_carry_the_password_hash() {
        let user = User::new("ruth".to_string(), "$argon2id$stub".to_string());

        let full = serde_json::to_value(user.to_response()).unwrap();
        assert!(full.get("password").is_none());
        assert_eq!(full["username"], "ruth");

        let public = serde_json::to_value(user.to_public()).unwrap();
        assert!(public.get("password").is_none());
    }

    #[test]
    fn profile_pic_is_camel_cased_on_the_wire() {
        let mut user = User::new("ruth".to_string(), "hash".to_string());
        user.profile_pic = Some("https://assets.example/ruth.png".to_string());

        let value = serde_json::to_value(user.to_public()).unwrap();
        assert_eq!(value["profilePic"], "https://assets.example/ruth.png");
    }
}
