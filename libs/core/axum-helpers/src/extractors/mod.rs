//! Custom extractors for Axum handlers.
//!
//! Each one rejects with an [`AppError`](crate::errors::AppError), so bad
//! input is reported in the same envelope as every other error.

pub mod object_id_path;
pub mod validated_json;
pub mod validated_query;

pub use object_id_path::ObjectIdPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
