pub mod envelope;
pub mod handlers;
pub mod responses;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Message returned for every 5xx; the underlying cause is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Body of every error response.
///
/// ```json
/// {
///   "statusCode": 404,
///   "timestamp": "2024-05-01T12:00:00.000Z",
///   "path": "/users/665f1c2b9d3e4a0012345678",
///   "message": "User with ID 665f1c2b9d3e4a0012345678 not found"
/// }
/// ```
///
/// `path` is filled in by the [`envelope::error_envelope`] middleware.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status code, repeated in the body
    #[schema(example = 404)]
    pub status_code: u16,
    /// When the error was produced (RFC 3339)
    pub timestamp: DateTime<Utc>,
    /// Request path that produced the error
    #[schema(example = "/users/665f1c2b9d3e4a0012345678")]
    pub path: String,
    /// Human-readable error message
    pub message: String,
    /// Per-field validation errors, when applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            timestamp: Utc::now(),
            path: String::new(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(self.clone())).into_response();
        // Kept on the response so the envelope middleware can stamp the path.
        response.extensions_mut().insert(self);
        response
    }
}

/// Boundary error type: every domain error converts into one of these
/// and is rendered as an [`ErrorResponse`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("JSON extraction error: {0}")]
    JsonRejection(#[from] JsonRejection),

    #[error("Query string error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Path parameter error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Method Not Allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::QueryRejection(_)
            | AppError::PathRejection(_) => StatusCode::BAD_REQUEST,
            AppError::JsonRejection(JsonRejection::MissingJsonContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::JsonRejection(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Validation(errors) => {
                tracing::info!(errors = %errors, "Validation failed");
                ErrorResponse::new(status, validation_message(&errors))
                    .with_details(validation_details(&errors))
            }
            AppError::JsonRejection(rejection) => {
                tracing::info!(error = %rejection.body_text(), "Rejected JSON body");
                ErrorResponse::new(status, rejection.body_text())
            }
            AppError::QueryRejection(rejection) => {
                tracing::info!(error = %rejection.body_text(), "Rejected query string");
                ErrorResponse::new(status, rejection.body_text())
            }
            AppError::PathRejection(rejection) => {
                tracing::info!(error = %rejection.body_text(), "Rejected path parameters");
                ErrorResponse::new(status, rejection.body_text())
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                ErrorResponse::new(status, msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!("Not found: {}", msg);
                ErrorResponse::new(status, msg)
            }
            AppError::MethodNotAllowed(msg) => ErrorResponse::new(status, msg),
            AppError::Conflict(msg) => {
                tracing::info!("Conflict: {}", msg);
                ErrorResponse::new(status, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                ErrorResponse::new(status, INTERNAL_ERROR_MESSAGE)
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                ErrorResponse::new(status, msg)
            }
        };

        body.into_response()
    }
}

/// One line summarising every failed field, e.g.
/// `Validation failed: age: must be between 0 and 150`.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: failed '{}' check", field, err.code),
            })
        })
        .collect();
    fields.sort();

    if fields.is_empty() {
        "Validation failed".to_string()
    } else {
        format!("Validation failed: {}", fields.join("; "))
    }
}

fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let entries: Vec<serde_json::Value> = errs
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(range(min = 0, max = 150, message = "must be between 0 and 150"))]
        age: i32,
    }

    #[tokio::test]
    async fn test_not_found_renders_envelope() {
        let response = AppError::NotFound("User with ID abc not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorResponse>().is_some());

        let body = body_of(response).await;
        assert_eq!(body.status_code, 404);
        assert_eq!(body.message, "User with ID abc not found");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response =
            AppError::InternalServerError("connection pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let errors = Payload { age: 200 }.validate().unwrap_err();
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body.message, "Validation failed: age: must be between 0 and 150");
        let details = body.details.unwrap();
        assert_eq!(details["age"][0]["code"], "range");
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            AppError::Conflict("Email already exists".into()).status(),
            StatusCode::CONFLICT
        );
    }
}
