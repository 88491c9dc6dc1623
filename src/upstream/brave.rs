use async_trait::async_trait;
use serde::Deserialize;

use super::{ensure_success, join_url, SearchHit, SearchProvider};
use crate::errors::GatewayError;

const PROVIDER: &str = "brave";
pub const MAX_COUNT: u32 = 20;
/// Results from the past day only.
const FRESHNESS: &str = "pd";
/// No regional bias.
const COUNTRY: &str = "ALL";

#[derive(Clone)]
pub struct BraveSearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BraveSearchClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl SearchProvider for BraveSearchClient {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, GatewayError> {
        let count = count.clamp(1, MAX_COUNT);
        let response = self
            .http
            .get(join_url(&self.base_url, "res/v1/web/search"))
            .header("X-Subscription-Token", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("q", query.to_string()),
                ("count", count.to_string()),
                ("freshness", FRESHNESS.to_string()),
                ("country", COUNTRY.to_string()),
            ])
            .send()
            .await?;
        let parsed: SearchResponse = ensure_success(PROVIDER, response).await?.json().await?;

        Ok(parsed
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .take(count as usize)
            .map(|result| SearchHit {
                title: result.title,
                url: result.url,
                snippet: result
                    .description
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty()),
            })
            .collect())
    }
}
