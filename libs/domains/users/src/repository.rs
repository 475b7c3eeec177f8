use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserChanges, UserFilter, normalize_email};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A taken email fails with `DuplicateEmail`.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// Lookup by normalized email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Users in insertion order
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Users whose id is in `ids`; unknown ids are skipped
    async fn list_by_ids(&self, ids: &[ObjectId]) -> UserResult<Vec<User>>;

    /// Writes only the changed fields and returns the stored result.
    /// Fails with `NotFound` when the id is gone.
    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<User>;

    /// Returns whether a record was removed
    async fn delete(&self, id: ObjectId) -> UserResult<bool>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// ObjectIds grow monotonically, so the map iterates in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| filter.is_active.is_none_or(|active| u.is_active == active))
            .cloned()
            .collect())
    }

    async fn list_by_ids(&self, ids: &[ObjectId]) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<User> {
        let mut users = self.users.write().await;

        if let Some(ref email) = changes.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                return Err(UserError::DuplicateEmail(email.clone()));
            }
        }

        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        changes.apply(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }
}
