//! Shared fixtures for tests that need a live HTTP server.

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::Router;

use crate::{
    build_app,
    cache::ResultCache,
    domain::tools::standard_registry,
    errors::GatewayError,
    mcp::server::Gateway,
    rate_limit::ClientRateLimiter,
    upstream::{Article, NewsProvider, SearchHit, SearchProvider, WeatherProvider},
    AppState,
};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{addr}")
}

/// Serves the full gateway with the given providers and returns the `/mcp`
/// endpoint URL.
pub async fn spawn_app(
    weather: Arc<dyn WeatherProvider>,
    news: Arc<dyn NewsProvider>,
    search: Arc<dyn SearchProvider>,
) -> String {
    let gateway = Gateway::new(
        standard_registry(weather, news, search),
        ResultCache::default(),
        ClientRateLimiter::default(),
    );
    let app = build_app(AppState::new(gateway, Vec::new()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind app listener");
    let addr = listener.local_addr().expect("app local addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("app server");
    });
    format!("http://{addr}/mcp")
}

#[derive(Default)]
pub struct StubNews {
    pub articles: Vec<Article>,
}

#[async_trait]
impl NewsProvider for StubNews {
    async fn top_headlines(
        &self,
        _category: &str,
        _country: Option<&str>,
        _page_size: u32,
    ) -> Result<Vec<Article>, GatewayError> {
        Ok(self.articles.clone())
    }
}

#[derive(Default)]
pub struct StubSearch {
    pub hits: Vec<SearchHit>,
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, _query: &str, _count: u32) -> Result<Vec<SearchHit>, GatewayError> {
        Ok(self.hits.clone())
    }
}
