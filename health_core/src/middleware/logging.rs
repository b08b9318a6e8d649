//! Request logging middleware configuration

use axum::body::Body;
use http::{Request, Response};
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, ServerErrorsFailureClass, SharedClassifier};
use tower_http::trace::{DefaultOnBodyChunk, DefaultOnEos, DefaultOnRequest, TraceLayer};
use tracing::{info_span, Span};

pub type LoggingLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    DefaultOnRequest,
    fn(&Response<Body>, Duration, &Span),
    DefaultOnBodyChunk,
    DefaultOnEos,
    fn(ServerErrorsFailureClass, Duration, &Span),
>;

pub fn logging_layer() -> LoggingLayer {
    TraceLayer::new_for_http()
        .make_span_with(make_span as fn(&Request<Body>) -> Span)
        .on_response(on_response as fn(&Response<Body>, Duration, &Span))
        .on_failure(on_failure as fn(ServerErrorsFailureClass, Duration, &Span))
}

fn make_span(request: &Request<Body>) -> Span {
    info_span!(
        "health_request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

fn on_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status();

    if status.is_success() {
        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "health request completed"
        );
    } else {
        tracing::warn!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "health request answered with error status"
        );
    }
}

// A failing parallel check answers 500; it is already logged by on_response.
fn on_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    tracing::debug!(
        latency_ms = latency.as_millis(),
        error = ?error,
        "request classified as failure"
    );
}
