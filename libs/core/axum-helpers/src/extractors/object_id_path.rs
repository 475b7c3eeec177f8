//! MongoDB ObjectId path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use mongodb::bson::oid::ObjectId;

/// Extractor for a single ObjectId path parameter.
///
/// Anything that is not a 24-character hex string is rejected with
/// 400 `Invalid MongoDB ObjectId: {value}` before the handler runs.
///
/// ```ignore
/// async fn get_user(ObjectIdPath(id): ObjectIdPath) -> String {
///     id.to_hex()
/// }
///
/// let app = Router::new().route("/users/{id}", get(get_user));
/// ```
pub struct ObjectIdPath(pub ObjectId);

impl<S> FromRequestParts<S> for ObjectIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;

        ObjectId::parse_str(&raw)
            .map(ObjectIdPath)
            .map_err(|_| AppError::BadRequest(format!("Invalid MongoDB ObjectId: {}", raw)))
    }
}
