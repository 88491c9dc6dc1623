//! Third-party data providers used by the lookup handlers
//!
//! Handlers only see the provider traits; the concrete adapters wrap a shared
//! `reqwest` client and translate transport failures into `GatewayError::Upstream`.

pub mod brave;
pub mod newsapi;
pub mod openweather;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub description: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub description: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolves a city name; `Ok(None)` when the provider knows no match.
    async fn geocode(&self, city: &str) -> Result<Option<Coordinates>, GatewayError>;

    async fn current(
        &self,
        at: Coordinates,
        units: &str,
    ) -> Result<CurrentConditions, GatewayError>;

    /// One entry per day starting today, in chronological order.
    async fn daily_forecast(
        &self,
        at: Coordinates,
        units: &str,
    ) -> Result<Vec<DailyForecast>, GatewayError>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn top_headlines(
        &self,
        category: &str,
        country: Option<&str>,
        page_size: u32,
    ) -> Result<Vec<Article>, GatewayError>;
}

/// Web search restricted to results from the past day, worldwide.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, GatewayError>;
}

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Fails with `GatewayError::Upstream` on any non-2xx status, keeping a short
/// excerpt of the body for the logs.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    tracing::warn!(provider, status = status.as_u16(), body = %excerpt, "upstream returned error status");
    Err(GatewayError::upstream(format!(
        "{provider} responded with status {}",
        status.as_u16()
    )))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
