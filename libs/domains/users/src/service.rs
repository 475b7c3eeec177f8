use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, UpdateUser, User, UserChanges, UserFilter, UserResponse, UserSummary,
};
use crate::repository::UserRepository;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a user. A taken email (case-insensitive) is a conflict.
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        let input = input.normalized();
        input.validate()?;

        let user = User::new(input);
        if self.repository.email_exists(&user.email).await? {
            return Err(UserError::DuplicateEmail(user.email));
        }

        let created = self.repository.create(user).await?;
        info!(
            target: "business",
            event = "user_created",
            user_id = %created.id,
            email = %created.email,
            "User created"
        );
        Ok(created.into())
    }

    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.list(UserFilter::default()).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn list_active_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.list(UserFilter::active()).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_user(&self, id: ObjectId) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    pub async fn get_user_by_email(&self, email: &str) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| UserError::EmailNotFound(email.trim().to_string()))?;

        Ok(user.into())
    }

    /// Partial update. Changing the email re-runs the duplicate check.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: ObjectId, input: UpdateUser) -> UserResult<UserResponse> {
        let input = input.normalized();
        input.validate()?;

        let current = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let changes = UserChanges::from(input);
        if let Some(ref email) = changes.email {
            if *email != current.email && self.repository.email_exists(email).await? {
                return Err(UserError::DuplicateEmail(email.clone()));
            }
        }

        let updated = self.repository.update(id, changes).await?;
        info!(target: "business", event = "user_updated", user_id = %updated.id, "User updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: ObjectId) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!(target: "business", event = "user_deleted", user_id = %id, "User deleted");
        Ok(())
    }

    /// `{id, name, email}` projections keyed by id, for embedding users in
    /// other resources. Ids that no longer resolve are absent from the map.
    pub async fn user_summaries(
        &self,
        ids: &[ObjectId],
    ) -> UserResult<HashMap<ObjectId, UserSummary>> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        let users = self.repository.list_by_ids(&unique).await?;
        Ok(users
            .iter()
            .map(|user| (user.id, UserSummary::from(user)))
            .collect())
    }
}
