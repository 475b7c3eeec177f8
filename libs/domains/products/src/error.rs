use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_users::UserError;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product with ID {0} not found")]
    NotFound(ObjectId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Owner lookup failed: {0}")]
    Owner(#[from] UserError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => {
                AppError::NotFound(format!("Product with ID {} not found", id))
            }
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Owner(err) => err.into(),
            ProductError::Database(msg) => AppError::InternalServerError(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ProductError {
    fn from(err: validator::ValidationErrors) -> Self {
        ProductError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let id = ObjectId::new();
        let not_found: AppError = ProductError::NotFound(id).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid: AppError = ProductError::Validation("Invalid owner ID format".into()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let database: AppError = ProductError::Database("timeout".into()).into();
        assert_eq!(database.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_owner_lookup_failure_keeps_user_mapping() {
        let app: AppError = ProductError::from(UserError::Database("down".into())).into();
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
