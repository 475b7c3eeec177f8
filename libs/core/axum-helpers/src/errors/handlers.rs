use axum::http::{Method, Uri};

use super::AppError;

/// Fallback for unmatched routes: `Cannot GET /nope`.
pub async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Cannot {} {}", method, uri.path()))
}

/// Fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("Cannot {} {}", method, uri.path()))
}
