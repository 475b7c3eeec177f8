//! Stamps the request path into error bodies.

use super::ErrorResponse;
use axum::{
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Middleware that rewrites every [`ErrorResponse`] body with the path of the
/// request that produced it.
///
/// Handlers and extractors deep in the stack don't know the full request path
/// (nested routers strip their prefix), so the body is finished here.
///
/// ```ignore
/// let app = Router::new()
///     .merge(routes)
///     .layer(axum::middleware::from_fn(error_envelope));
/// ```
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    let Some(body) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);

    let (_, stamped) = body.with_path(path).into_response().into_parts();
    Response::from_parts(parts, stamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn missing() -> AppError {
        AppError::NotFound("Product with ID 1 not found".into())
    }

    async fn ok() -> &'static str {
        "fine"
    }

    fn app() -> Router {
        let nested = Router::new()
            .route("/missing", get(missing))
            .route("/ok", get(ok));
        Router::new()
            .nest("/products", nested)
            .layer(middleware::from_fn(error_envelope))
    }

    #[tokio::test]
    async fn test_error_body_gets_full_request_path() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/products/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.path, "/products/missing");
        assert_eq!(body.status_code, 404);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/products/ok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"fine");
    }
}
