use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::users::model::{ProfileUpdate, User};
use crate::users::password::{hash_password, verify_password};

/// Outcome of a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registered {
    pub id: u64,
    pub email: String,
}

/// CRUD contract over user records. Implemented by the on-disk JSON store
/// and by an in-memory store for tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn register(&self, email: &str, password: &str) -> Result<Registered, StoreError>;
    async fn login(&self, email: &str, password: &str) -> Result<User, StoreError>;
    async fn get(&self, user_id: u64) -> Result<User, StoreError>;
    async fn update_profile(
        &self,
        user_id: u64,
        update: ProfileUpdate,
    ) -> Result<User, StoreError>;
    async fn change_password(
        &self,
        user_id: u64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), StoreError>;
    async fn add_favorite(&self, user_id: u64, item: Value) -> Result<Vec<Value>, StoreError>;
    async fn remove_favorite(&self, user_id: u64, index: usize)
        -> Result<Vec<Value>, StoreError>;
}

// Domain operations on the in-memory user list, shared by both stores.

fn next_id(users: &[User]) -> u64 {
    users.iter().map(|u| u.id).max().unwrap_or(0) + 1
}

fn find_mut(users: &mut [User], user_id: u64) -> Result<&mut User, StoreError> {
    users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or(StoreError::NotFound)
}

fn register_in(users: &mut Vec<User>, email: &str, password: &str) -> Result<Registered, StoreError> {
    if users.iter().any(|u| u.email == email) {
        return Err(StoreError::DuplicateEmail);
    }
    let user = User::new(next_id(users), email.to_string(), hash_password(password));
    let registered = Registered {
        id: user.id,
        email: user.email.clone(),
    };
    users.push(user);
    Ok(registered)
}

fn login_in(users: &[User], email: &str, password: &str) -> Result<User, StoreError> {
    let user = users
        .iter()
        .find(|u| u.email == email)
        .ok_or(StoreError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(StoreError::InvalidCredentials);
    }
    Ok(user.clone())
}

fn update_profile_in(
    users: &mut [User],
    user_id: u64,
    update: ProfileUpdate,
) -> Result<User, StoreError> {
    let user = find_mut(users, user_id)?;
    update.apply(user);
    Ok(user.clone())
}

fn change_password_in(
    users: &mut [User],
    user_id: u64,
    old_password: &str,
    new_password: &str,
) -> Result<(), StoreError> {
    let user = find_mut(users, user_id)?;
    if !verify_password(old_password, &user.password_hash)? {
        return Err(StoreError::InvalidCredentials);
    }
    user.password_hash = hash_password(new_password);
    user.updated_at = Some(time::OffsetDateTime::now_utc());
    Ok(())
}

fn add_favorite_in(users: &mut [User], user_id: u64, item: Value) -> Result<Vec<Value>, StoreError> {
    let user = find_mut(users, user_id)?;
    user.favorites.push(item);
    user.updated_at = Some(time::OffsetDateTime::now_utc());
    Ok(user.favorites.clone())
}

fn remove_favorite_in(
    users: &mut [User],
    user_id: u64,
    index: usize,
) -> Result<Vec<Value>, StoreError> {
    let user = find_mut(users, user_id)?;
    if user.favorites.is_empty() {
        return Err(StoreError::EmptyFavorites);
    }
    // Out-of-range indices on a non-empty list are a no-op.
    if index < user.favorites.len() {
        user.favorites.remove(index);
    }
    user.updated_at = Some(time::OffsetDateTime::now_utc());
    Ok(user.favorites.clone())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    users: Vec<User>,
}

/// Flat-file JSON store: one document `{"users": [...]}`, loaded and saved
/// whole on every operation.
///
/// The mutex serializes read-modify-write cycles within this process, so
/// concurrent requests cannot clobber each other. Writers in other processes
/// are not synchronized; last write wins at the file level.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, creating the database file (and parent directories)
    /// with an empty user list if it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            let empty = serde_json::to_string_pretty(&UsersFile::default())?;
            tokio::fs::write(&path, empty).await?;
            info!(path = %path.display(), "created users database file");
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    async fn load(&self) -> Result<Vec<User>, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let file: UsersFile = serde_json::from_str(&raw)?;
        Ok(file.users)
    }

    async fn save(&self, users: Vec<User>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&UsersFile { users })?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    /// Load the document, apply `op`, and write it back only if `op`
    /// succeeded. The guard is held for the whole cycle.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Vec<User>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let mut users = self.load().await?;
        let out = op(&mut users)?;
        self.save(users).await?;
        Ok(out)
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn register(&self, email: &str, password: &str) -> Result<Registered, StoreError> {
        let registered = self
            .mutate(|users| register_in(users, email, password))
            .await?;
        info!(user_id = registered.id, email = %registered.email, "user registered");
        Ok(registered)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let _guard = self.lock.lock().await;
        let users = self.load().await?;
        let user = login_in(&users, email, password)?;
        debug!(user_id = user.id, "login verified");
        Ok(user)
    }

    async fn get(&self, user_id: u64) -> Result<User, StoreError> {
        let _guard = self.lock.lock().await;
        let users = self.load().await?;
        users
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: u64,
        update: ProfileUpdate,
    ) -> Result<User, StoreError> {
        self.mutate(|users| update_profile_in(users, user_id, update))
            .await
    }

    async fn change_password(
        &self,
        user_id: u64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        self.mutate(|users| change_password_in(users, user_id, old_password, new_password))
            .await
    }

    async fn add_favorite(&self, user_id: u64, item: Value) -> Result<Vec<Value>, StoreError> {
        self.mutate(|users| add_favorite_in(users, user_id, item))
            .await
    }

    async fn remove_favorite(
        &self,
        user_id: u64,
        index: usize,
    ) -> Result<Vec<Value>, StoreError> {
        self.mutate(|users| remove_favorite_in(users, user_id, index))
            .await
    }
}

/// In-memory store with the same contract, for deterministic tests.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn register(&self, email: &str, password: &str) -> Result<Registered, StoreError> {
        register_in(&mut *self.users.lock().await, email, password)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        login_in(&self.users.lock().await, email, password)
    }

    async fn get(&self, user_id: u64) -> Result<User, StoreError> {
        self.users
            .lock()
            .await
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: u64,
        update: ProfileUpdate,
    ) -> Result<User, StoreError> {
        update_profile_in(&mut self.users.lock().await, user_id, update)
    }

    async fn change_password(
        &self,
        user_id: u64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), StoreError> {
        change_password_in(&mut self.users.lock().await, user_id, old_password, new_password)
    }

    async fn add_favorite(&self, user_id: u64, item: Value) -> Result<Vec<Value>, StoreError> {
        add_favorite_in(&mut self.users.lock().await, user_id, item)
    }

    async fn remove_favorite(
        &self,
        user_id: u64,
        index: usize,
    ) -> Result<Vec<Value>, StoreError> {
        remove_favorite_in(&mut self.users.lock().await, user_id, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn register_then_duplicate_then_login() {
        let store = MemoryStore::default();

        let registered = store.register("a@b.com", "secret1").await.expect("register");
        assert_eq!(registered.id, 1);
        assert_eq!(registered.email, "a@b.com");

        let err = store.register("a@b.com", "other").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let err = store.login("a@b.com", "wrongpw").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));

        let user = store.login("a@b.com", "secret1").await.expect("login");
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn login_unknown_email_is_invalid_credentials() {
        let store = MemoryStore::default();
        let err = store.login("nobody@campus.edu", "pw").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn email_comparison_is_case_sensitive() {
        let store = MemoryStore::default();
        store.register("A@b.com", "secret1").await.unwrap();
        // Different case registers as a distinct account.
        let second = store.register("a@b.com", "secret1").await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn ids_are_max_plus_one() {
        let store = MemoryStore::default();
        assert_eq!(store.register("a@x.com", "pw1234").await.unwrap().id, 1);
        assert_eq!(store.register("b@x.com", "pw1234").await.unwrap().id, 2);
        assert_eq!(store.register("c@x.com", "pw1234").await.unwrap().id, 3);
    }

    #[tokio::test]
    async fn partial_update_only_touches_present_fields() {
        let store = MemoryStore::default();
        let id = store.register("a@b.com", "secret1").await.unwrap().id;

        store
            .update_profile(
                id,
                ProfileUpdate {
                    goal: Some("cut".into()),
                    calories: Some(2200),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let user = store
            .update_profile(
                id,
                ProfileUpdate {
                    age: Some(20),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(user.goal.as_deref(), Some("cut"));
        assert_eq!(user.calories, Some(2200));
        assert_eq!(user.age, Some(20));
        assert!(user.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_profile_unknown_user_is_not_found() {
        let store = MemoryStore::default();
        let err = store
            .update_profile(99, ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn favorites_add_remove_and_empty_error() {
        let store = MemoryStore::default();
        let id = store.register("a@b.com", "secret1").await.unwrap().id;

        let err = store.remove_favorite(id, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyFavorites));

        let favorites = store
            .add_favorite(id, json!({"name": "pizza", "hall": "north"}))
            .await
            .unwrap();
        assert_eq!(favorites.len(), 1);

        let favorites = store.remove_favorite(id, 0).await.unwrap();
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_removal_is_a_noop() {
        let store = MemoryStore::default();
        let id = store.register("a@b.com", "secret1").await.unwrap().id;
        store.add_favorite(id, json!("granola")).await.unwrap();

        let favorites = store.remove_favorite(id, 5).await.unwrap();
        assert_eq!(favorites, vec![json!("granola")]);
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let store = MemoryStore::default();
        let id = store.register("a@b.com", "secret1").await.unwrap().id;

        let err = store
            .change_password(id, "wrong-old", "brand-new")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
        // Old password still verifies after the failed attempt.
        store.login("a@b.com", "secret1").await.expect("old password intact");

        store
            .change_password(id, "secret1", "brand-new")
            .await
            .expect("change password");
        store.login("a@b.com", "brand-new").await.expect("new password works");
        let err = store.login("a@b.com", "secret1").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn file_store_creates_file_and_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("users.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            let registered = store.register("a@b.com", "secret1").await.unwrap();
            assert_eq!(registered.id, 1);
        }

        let raw = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["users"].as_array().unwrap().len(), 1);

        let store = JsonFileStore::open(&path).await.unwrap();
        let user = store.login("a@b.com", "secret1").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(store.register("b@c.com", "secret2").await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn file_store_open_on_empty_document_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        let err = store.get(1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn file_store_failed_change_does_not_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        let id = store.register("a@b.com", "secret1").await.unwrap().id;
        let before = std::fs::read_to_string(&path).unwrap();

        let err = store.change_password(id, "nope", "other").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));

        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(before, after);
    }
}
