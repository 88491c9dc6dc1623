//! Tracing setup and the per-request access log.

use std::{net::SocketAddr, time::Instant};

use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, fmt};

/// Used when `RUST_LOG` is unset; keeps the HTTP client stack quiet.
const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn";

pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Level of the access line for a response status. Upstream failures are
/// errors, rejected calls are warnings.
pub fn access_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

pub async fn access_log(request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let latency_ms = started_at.elapsed().as_millis();

    let level = access_level(response.status());
    if level == Level::ERROR {
        error!(%method, %path, ?peer, status, latency_ms, "call failed");
    } else if level == Level::WARN {
        warn!(%method, %path, ?peer, status, latency_ms, "call rejected");
    } else {
        info!(%method, %path, ?peer, status, latency_ms, "call served");
    }

    response
}
