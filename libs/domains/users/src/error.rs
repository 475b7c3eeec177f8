use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with ID {0} not found")]
    NotFound(ObjectId),

    #[error("User with email {0} not found")]
    EmailNotFound(String),

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User with ID {} not found", id)),
            UserError::EmailNotFound(email) => {
                AppError::NotFound(format!("User with email {} not found", email))
            }
            UserError::DuplicateEmail(_) => AppError::Conflict("Email already exists".to_string()),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Database(msg) => AppError::InternalServerError(msg),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(err: validator::ValidationErrors) -> Self {
        UserError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_duplicate_email_is_conflict() {
        let app: AppError = UserError::DuplicateEmail("a@x.com".into()).into();
        assert_eq!(app.status(), StatusCode::CONFLICT);
        assert_eq!(app.to_string(), "Conflict: Email already exists");
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let id = ObjectId::parse_str("665f1c2b9d3e4a0012345678").unwrap();
        let app: AppError = UserError::NotFound(id).into();
        assert_eq!(app.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            app.to_string(),
            "Not Found: User with ID 665f1c2b9d3e4a0012345678 not found"
        );
    }

    #[test]
    fn test_database_error_is_internal() {
        let app: AppError = UserError::Database("pool closed".into()).into();
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
