//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `Validate` before the handler sees the value.
///
/// Malformed JSON, unknown fields (for `deny_unknown_fields` types) and
/// failed rules all reject with 400 and the standard error body.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct StockUpdate {
///     #[validate(range(min = 0))]
///     quantity: i64,
/// }
///
/// async fn update_stock(ValidatedJson(input): ValidatedJson<StockUpdate>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorResponse;
    use axum::{Router, body::Body, http::StatusCode, http::header, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct StockUpdate {
        #[validate(range(min = 0))]
        quantity: i64,
    }

    async fn handler(ValidatedJson(input): ValidatedJson<StockUpdate>) -> String {
        input.quantity.to_string()
    }

    async fn post_json(body: &'static str) -> (StatusCode, Vec<u8>) {
        let app = Router::new().route("/stock", post(handler));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/stock")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let (status, body) = post_json(r#"{"quantity": 12}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"12");
    }

    #[tokio::test]
    async fn test_rule_violation_is_bad_request() {
        let (status, body) = post_json(r#"{"quantity": -1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(body.message.contains("quantity"));
        assert!(body.details.is_some());
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let (status, body) = post_json(r#"{"quantity": 1, "price": 3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(body.message.contains("unknown field"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (status, _) = post_json(r#"{"quantity": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
