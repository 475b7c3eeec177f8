use super::shutdown::ShutdownCoordinator;
use crate::errors::envelope::error_envelope;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::{cors_layer_from_env, request_trace_layer, security_headers};
use axum::{Router, middleware};
use core_config::{Environment, server::ServerConfig};
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tracing::info;
use utoipa::OpenApi;

/// Combines domain routers with API documentation and cross-cutting middleware.
///
/// Sets up:
/// - OpenAPI documentation: Swagger UI (`/swagger-ui`, spec at
///   `/api-docs/openapi.json`), ReDoc (`/redoc`), RapiDoc (`/rapidoc`),
///   Scalar (`/scalar`)
/// - API routes merged at the root
/// - 404/405 fallbacks in the standard error body
/// - Error envelope, request logging, security headers, CORS, compression
///
/// Domain routers should already have their state applied. Health endpoints
/// are merged by the app afterwards.
///
/// # Errors
/// Fails when the CORS configuration is invalid, or missing in production
/// (see [`cors_layer_from_env`]).
///
/// ```ignore
/// let router = create_router::<ApiDoc>(api_routes, &Environment::from_env())?
///     .merge(health_router(app_info!()));
/// ```
pub fn create_router<T>(apis: Router, environment: &Environment) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors_layer = cors_layer_from_env(environment)?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(error_envelope))
        .layer(request_trace_layer())
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serves `router` until SIGINT/SIGTERM, then runs `cleanup` bounded by
/// `shutdown_timeout`.
///
/// ```ignore
/// let cleanup = async move { client.shutdown().await };
/// create_production_app(router, &config.server, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let cleanup_coordinator = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.socket_addr()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        cleanup_coordinator.wait_for_signal().await;

        info!(?shutdown_timeout, "Starting cleanup tasks");
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => tracing::warn!(
                ?shutdown_timeout,
                "Cleanup exceeded timeout, forcing shutdown"
            ),
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { coordinator.wait_for_signal().await })
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    cleanup_handle.await.ok();

    serve_result
}
