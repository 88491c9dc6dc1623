//! Client identity used for rate limiting
//!
//! The peer address identifies the client. When the peer is a trusted
//! proxy, the left-most valid `X-Forwarded-For` address is used instead.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::HeaderMap;
use ipnet::IpNet;

const FORWARDED_FOR: &str = "x-forwarded-for";

pub fn resolve_client_ip(
    peer: Option<SocketAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[IpNet],
) -> IpAddr {
    let Some(peer) = peer.map(|addr| addr.ip()) else {
        // Only reachable when the server runs without connect info; all such
        // requests share one budget.
        return IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    };

    if !trusted_proxies.iter().any(|net| net.contains(&peer)) {
        return peer;
    }

    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .unwrap_or(peer)
}
