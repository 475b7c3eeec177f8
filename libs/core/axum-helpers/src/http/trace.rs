//! Request logging.

use axum::http::Response;
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{
        DefaultMakeSpan, DefaultOnBodyChunk, DefaultOnEos, DefaultOnRequest, OnResponse,
        TraceLayer,
    },
};
use tracing::{Level, Span};

/// Logs one line per completed request, levelled by status:
/// 5xx at error, 4xx at warn, everything else at info.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogResponse;

impl<B> OnResponse<B> for LogResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status();
        let latency_ms = latency.as_millis() as u64;
        let code = status.as_u16();

        if status.is_server_error() {
            tracing::error!(status = code, latency_ms, "request failed");
        } else if status.is_client_error() {
            tracing::warn!(status = code, latency_ms, "request rejected");
        } else {
            tracing::info!(status = code, latency_ms, "request completed");
        }
    }
}

/// `TraceLayer` that opens an info span per request (method, URI, version)
/// and reports the outcome through [`LogResponse`]. Failures are not logged a
/// second time by the classifier.
pub fn request_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    LogResponse,
    DefaultOnBodyChunk,
    DefaultOnEos,
    (),
> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(LogResponse)
        .on_failure(())
}
