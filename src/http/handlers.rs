//! Axum HTTP handlers for the web server
//!
//! Provides the gateway endpoint and general metadata endpoints.

use std::net::SocketAddr;

use axum::{
    body::to_bytes,
    extract::{ConnectInfo, Request, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::registry::RouteInfo;
use crate::errors::GatewayError;
use crate::http::client_ip::resolve_client_ip;
use crate::mcp::rpc::decode_request;
use crate::AppState;

pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
    pub routes: Vec<RouteInfo>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery(State(state): State<AppState>) -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
        routes: state.gateway.registry().routes(),
    })
}

pub async fn mcp_endpoint(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = resolve_client_ip(peer, &parts.headers, &state.trusted_proxies);

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return GatewayError::InvalidEnvelope("request body is too large or unreadable".into())
                .into_response()
        }
    };

    let rpc = match decode_request(&body) {
        Ok(rpc) => rpc,
        Err(err) => return err.into_response(),
    };

    match state.gateway.handle_call(client, rpc).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}
