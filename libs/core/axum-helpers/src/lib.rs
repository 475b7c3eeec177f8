//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS, security headers, request logging
//! - **[`errors`]**: the `{statusCode, timestamp, path, message}` error body
//! - **[`extractors`]**: ObjectId paths, validated JSON and query strings
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::{Environment, server::ServerConfig};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let router = create_router::<ApiDoc>(Router::new(), &Environment::from_env())?;
//!     create_production_app(router, &ServerConfig::default(), Duration::from_secs(30), async {}).await
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks,
};

pub use http::{
    cors_layer_from_env, create_cors_layer, create_permissive_cors_layer, request_trace_layer,
    security_headers,
};

pub use errors::{AppError, ErrorResponse};

pub use extractors::{ObjectIdPath, ValidatedJson, ValidatedQuery};
