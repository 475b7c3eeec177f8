use chrono::{DateTime, Utc};
use database::mongodb::bson_datetime;
use mongodb::bson::{Document, oid::ObjectId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// User entity as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Unique, stored trimmed and lowercase
    pub email: String,
    pub age: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Canonical form of an email address for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Request emails are normalized while decoding, ahead of validation.
mod email_input {
    use super::normalize_email;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(|email| normalize_email(&email))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let email = Option::<String>::deserialize(deserializer)?;
        Ok(email.as_deref().map(normalize_email))
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

impl User {
    /// Builds a new user with a fresh id, normalizing name and email.
    pub fn new(input: CreateUser) -> Self {
        let now = bson_datetime::now();
        Self {
            id: ObjectId::new(),
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            age: input.age,
            is_active: input.is_active.unwrap_or(true),
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The fields a partial update writes. Anything absent stays as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

impl From<UpdateUser> for UserChanges {
    fn from(update: UpdateUser) -> Self {
        Self {
            name: update.name.map(|name| name.trim().to_string()),
            email: update.email.as_deref().map(normalize_email),
            age: update.age,
            is_active: update.is_active,
            tags: update.tags,
            updated_at: bson_datetime::now(),
        }
    }
}

impl UserChanges {
    pub fn apply(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name = name.clone();
        }
        if let Some(ref email) = self.email {
            user.email = email.clone();
        }
        if let Some(age) = self.age {
            user.age = age;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        if let Some(ref tags) = self.tags {
            user.tags = tags.clone();
        }
        user.updated_at = self.updated_at;
    }

    /// Body of the `$set` stage: changed fields and `updatedAt`.
    pub fn to_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(ref name) = self.name {
            set.insert("name", name.as_str());
        }
        if let Some(ref email) = self.email {
            set.insert("email", email.as_str());
        }
        if let Some(age) = self.age {
            set.insert("age", age);
        }
        if let Some(is_active) = self.is_active {
            set.insert("isActive", is_active);
        }
        if let Some(ref tags) = self.tags {
            set.insert("tags", tags.clone());
        }
        set.insert("updatedAt", bson_datetime::to_bson(&self.updated_at));
        set
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUser {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[serde(deserialize_with = "email_input::deserialize")]
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(range(min = 0, max = 150, message = "must be between 0 and 150"))]
    #[schema(example = 36, minimum = 0, maximum = 150)]
    pub age: i32,
    /// Defaults to `true`
    pub is_active: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateUser {
    /// Canonical email, so validation sees what will be stored.
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

/// DTO for a partial user update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUser {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "email_input::deserialize_option")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(range(min = 0, max = 150, message = "must be between 0 and 150"))]
    #[schema(minimum = 0, maximum = 150)]
    pub age: Option<i32>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl UpdateUser {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.as_deref().map(normalize_email);
        self
    }
}

/// Repository-level filter
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub is_active: Option<bool>,
}

impl UserFilter {
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
        }
    }
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "665f1c2b9d3e4a0012345678")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            age: user.age,
            is_active: user.is_active,
            tags: user.tags,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Owner projection embedded in product responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    #[schema(example = "665f1c2b9d3e4a0012345678")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
