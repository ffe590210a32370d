//! Request logging and metrics.
//!
//! Both layers are pass-through: they observe the request and the response
//! and never change or short-circuit either.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::http;
use axum::middleware::Next;
use axum::response::Response;
use tower_http::trace::MakeSpan;
use tracing::{info_span, Span};

use crate::observability::{REQUESTS_TOTAL, REQUEST_DURATION};

/// Span carrying method, path and the calling address.
///
/// The address comes from `ConnectInfo`, which is only present when the
/// router is served from a real listener; in-process calls log `-`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, req: &http::Request<B>) -> Span {
        let remote = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_else(|| "-".to_string());
        info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            remote = %remote,
        )
    }
}

pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let response = next.run(req).await;
    REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), response.status().as_str()])
        .inc();
    REQUEST_DURATION.observe(start.elapsed().as_secs_f64());
    response
}
