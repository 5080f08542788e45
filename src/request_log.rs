//! Per-request access log for the HTTP layer.

use axum::http::{Response, StatusCode};
use std::time::Duration;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, HttpMakeClassifier, OnResponse, TraceLayer,
};
use tracing::{Level, Span, error, info, warn};

pub type RequestTraceLayer =
    TraceLayer<HttpMakeClassifier, DefaultMakeSpan, DefaultOnRequest, LogResponse, (), (), ()>;

/// INFO-level request spans carrying method and uri, closed by one event per
/// response whose level follows the status class.
pub fn request_trace_layer() -> RequestTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(LogResponse)
        .on_body_chunk(())
        .on_eos(())
        .on_failure(())
}

/// 5xx logs at ERROR, 4xx at WARN, everything else at INFO.
pub fn response_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogResponse;

impl<B> OnResponse<B> for LogResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status().as_u16();
        let latency_ms = latency.as_secs_f64() * 1000.0;
        let level = response_level(response.status());

        if level == Level::ERROR {
            error!(parent: span, status, latency_ms, "Request failed");
        } else if level == Level::WARN {
            warn!(parent: span, status, latency_ms, "Request rejected");
        } else {
            info!(parent: span, status, latency_ms, "Request completed");
        }
    }
}
