use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

fn default_notifications() -> bool {
    true
}

/// User record as persisted in the JSON database file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,                          // unique, assigned max(existing)+1
    pub email: String,                    // unique, compared case-sensitively
    pub password_hash: String,            // "salt:hash" hex pair (PBKDF2-SHA512)
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default = "default_notifications")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub favorites: Vec<serde_json::Value>, // ordered, opaque food items
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl User {
    pub fn new(id: u64, email: String, password_hash: String) -> Self {
        Self {
            id,
            email,
            password_hash,
            goal: None,
            age: None,
            sex: None,
            calories: None,
            dietary_restrictions: Vec::new(),
            notifications_enabled: true,
            favorites: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }
}

/// Fields a profile update may carry. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub goal: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub calories: Option<u32>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub notifications_enabled: Option<bool>,
}

impl ProfileUpdate {
    /// Apply the fields present in this update to `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(goal) = self.goal {
            user.goal = Some(goal);
        }
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(sex) = self.sex {
            user.sex = Some(sex);
        }
        if let Some(calories) = self.calories {
            user.calories = Some(calories);
        }
        if let Some(restrictions) = self.dietary_restrictions {
            user.dietary_restrictions = restrictions;
        }
        if let Some(enabled) = self.notifications_enabled {
            user.notifications_enabled = enabled;
        }
        user.updated_at = Some(OffsetDateTime::now_utc());
    }
}
