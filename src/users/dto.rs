use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::users::model::User;

/// Request body for registration. Fields are optional so a missing field
/// becomes a 400 with a message rather than a body-rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: u64,
    pub email: String,
    pub message: &'static str,
}

/// Profile subset returned on login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: u64,
    pub email: String,
    pub goal: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub calories: Option<u32>,
    pub message: &'static str,
}

/// Full public profile (no password hash).
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: u64,
    pub email: String,
    pub goal: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub calories: Option<u32>,
    pub dietary_restrictions: Vec<String>,
    pub notifications_enabled: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            goal: user.goal,
            age: user.age,
            sex: user.sex,
            calories: user.calories,
            dietary_restrictions: user.dietary_restrictions,
            notifications_enabled: user.notifications_enabled,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedProfileResponse {
    pub message: &'static str,
    pub user: ProfileResponse,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    #[serde(rename = "foodItem")]
    pub food_item: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub message: &'static str,
    pub favorites: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_response_hides_password_hash() {
        let user = User::new(1, "test@example.com".into(), "salt:hash".into());
        let json = serde_json::to_string(&ProfileResponse::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("salt:hash"));
    }

    #[test]
    fn change_password_body_uses_camel_case() {
        let body: ChangePasswordRequest =
            serde_json::from_str(r#"{"oldPassword":"a","newPassword":"b"}"#).unwrap();
        assert_eq!(body.old_password.as_deref(), Some("a"));
        assert_eq!(body.new_password.as_deref(), Some("b"));
    }
}
