//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::check_health_detailed;
use tracing::debug;

use crate::state::AppState;

/// `GET /ready`: 200 when MongoDB answers a ping, 503 otherwise
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let client = state.mongo_client.clone();
    let mongodb: HealthCheckFuture = Box::pin(async move {
        let status = check_health_detailed(&client).await;
        debug!(response_time_ms = status.response_time_ms, "MongoDB ping");

        if status.healthy {
            Ok(())
        } else {
            Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
        }
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}
