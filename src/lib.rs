use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use ipnet::IpNet;

pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod rate_limit;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;

use cache::ResultCache;
use config::Config;
use domain::tools::standard_registry;
use mcp::server::Gateway;
use rate_limit::ClientRateLimiter;
use upstream::{
    brave::BraveSearchClient, build_http_client, newsapi::NewsApiClient,
    openweather::OpenWeatherClient,
};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub trusted_proxies: Arc<[IpNet]>,
}

impl AppState {
    pub fn new(gateway: Gateway, trusted_proxies: Vec<IpNet>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            trusted_proxies: Arc::from(trusted_proxies),
        }
    }
}

/// Wires the upstream adapters, route table, cache and rate limiter from
/// the startup configuration.
pub fn build_gateway(config: &Config) -> Result<Gateway, reqwest::Error> {
    let http = build_http_client(config.upstream_timeout)?;

    let weather = Arc::new(OpenWeatherClient::new(
        http.clone(),
        config.openweather_base_url.clone(),
        config.openweather_api_key.clone(),
    ));
    let news = Arc::new(NewsApiClient::new(
        http.clone(),
        config.news_api_base_url.clone(),
        config.news_api_key.clone(),
    ));
    let search = Arc::new(BraveSearchClient::new(
        http,
        config.brave_search_base_url.clone(),
        config.brave_search_api_key.clone(),
    ));

    Ok(Gateway::new(
        standard_registry(weather, news, search),
        ResultCache::new(config.cache_ttl, config.cache_capacity),
        ClientRateLimiter::new(config.rate_limit_requests, config.rate_limit_window),
    ))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route("/mcp", post(http::handlers::mcp_endpoint))
        .layer(middleware::from_fn(logging::access_log))
        .with_state(state)
}
