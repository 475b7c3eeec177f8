//! HTTP middleware module.
//!
//! - CORS configuration
//! - Security headers
//! - Request/response logging
//!
//! ```ignore
//! use axum_helpers::http::{request_trace_layer, security_headers};
//!
//! let app = Router::new()
//!     .layer(request_trace_layer())
//!     .layer(axum::middleware::from_fn(security_headers));
//! ```

pub mod cors;
pub mod security;
pub mod trace;

pub use cors::{cors_layer_from_env, create_cors_layer, create_permissive_cors_layer};
pub use security::security_headers;
pub use trace::{LogResponse, request_trace_layer};
