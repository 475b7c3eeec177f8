//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use database::mongodb::is_duplicate_key_error;
use database::timed;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserChanges, UserFilter, normalize_email};
use crate::repository::UserRepository;

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "users")
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<User>(collection_name),
        }
    }

    /// Creates the unique email index and the `isActive` index.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "isActive": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_is_active".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    fn build_filter(filter: &UserFilter) -> Document {
        let mut doc = Document::new();
        if let Some(is_active) = filter.is_active {
            doc.insert("isActive", is_active);
        }
        doc
    }
}

fn write_error(err: mongodb::error::Error, email: &str) -> UserError {
    if is_duplicate_key_error(&err) {
        UserError::DuplicateEmail(email.to_string())
    } else {
        err.into()
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        timed("users.insert_one", self.collection.insert_one(&user))
            .await
            .map_err(|e| write_error(e, &user.email))?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let user = timed("users.find_one", self.collection.find_one(doc! { "_id": id })).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let filter = doc! { "email": normalize_email(email) };
        let user = timed("users.find_one", self.collection.find_one(filter)).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let cursor = timed(
            "users.find",
            self.collection
                .find(Self::build_filter(&filter))
                .sort(doc! { "_id": 1 }),
        )
        .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn list_by_ids(&self, ids: &[ObjectId]) -> UserResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let cursor = timed("users.find", self.collection.find(filter)).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<User> {
        let updated = timed(
            "users.find_one_and_update",
            self.collection
                .find_one_and_update(doc! { "_id": id }, doc! { "$set": changes.to_document() })
                .return_document(ReturnDocument::After),
        )
        .await
        .map_err(|e| write_error(e, changes.email.as_deref().unwrap_or_default()))?;

        updated.ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> UserResult<bool> {
        let result = timed("users.delete_one", self.collection.delete_one(doc! { "_id": id })).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let filter = doc! { "email": normalize_email(email) };
        let count = timed("users.count_documents", self.collection.count_documents(filter)).await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoUserRepository::build_filter(&UserFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_active_only() {
        let doc = MongoUserRepository::build_filter(&UserFilter::active());
        assert!(doc.get_bool("isActive").unwrap());
    }
}
